use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ReelError;
use crate::model::input::MovieDraft;

// ---------------------------------------------------------------------------
// MovieId: opaque identity assigned once at creation
// ---------------------------------------------------------------------------

/// Stable identity of a movie across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Allocate a fresh, globally unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MovieId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|err| ReelError::Parse(format!("invalid movie id '{}': {}", s, err)))
    }
}

// ---------------------------------------------------------------------------
// Movie: immutable catalog entity
// ---------------------------------------------------------------------------

/// A movie in the catalog.
///
/// Values are immutable snapshots: every edit produces a new `Movie` carrying
/// the same `id`. Equality and hashing consider the id only; use
/// [`Movie::same_content`] for a field-for-field comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    id: MovieId,
    title: String,
    director: String,
    year: i32,
    rating: u8,
    category: Category,
    status: Status,
}

impl Movie {
    /// Build a new movie from validated fields, assigning a fresh id.
    pub fn create(draft: MovieDraft) -> Self {
        Self::with_id(MovieId::new(), draft)
    }

    /// Build a movie from validated fields under an existing id.
    pub fn with_id(id: MovieId, draft: MovieDraft) -> Self {
        Self {
            id,
            title: draft.title,
            director: draft.director,
            year: draft.year,
            rating: draft.rating,
            category: draft.category,
            status: draft.status,
        }
    }

    /// Produce the edited version of this movie: same id, every other field
    /// taken from `draft`.
    pub fn revise(&self, draft: MovieDraft) -> Self {
        Self::with_id(self.id, draft)
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn director(&self) -> &str {
        &self.director
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }

    pub fn with_director(&self, director: impl Into<String>) -> Self {
        Self {
            director: director.into(),
            ..self.clone()
        }
    }

    pub fn with_year(&self, year: i32) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    pub fn with_rating(&self, rating: u8) -> Self {
        Self {
            rating,
            ..self.clone()
        }
    }

    pub fn with_category(&self, category: Category) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Field-for-field comparison, id included.
    pub fn same_content(&self, other: &Movie) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.director == other.director
            && self.year == other.year
            && self.rating == other.rating
            && self.category == other.category
            && self.status == other.status
    }
}

impl PartialEq for Movie {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Movie {}

impl Hash for Movie {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) by {} [{} / {} / {}★]",
            self.title, self.year, self.director, self.category, self.status, self.rating
        )
    }
}

// ---------------------------------------------------------------------------
// Category and Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Action,
    Comedy,
    Drama,
    Horror,
    SciFi,
    Romance,
    Thriller,
    Documentary,
    Animation,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Action,
        Category::Comedy,
        Category::Drama,
        Category::Horror,
        Category::SciFi,
        Category::Romance,
        Category::Thriller,
        Category::Documentary,
        Category::Animation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Action => "Action",
            Category::Comedy => "Comedy",
            Category::Drama => "Drama",
            Category::Horror => "Horror",
            Category::SciFi => "Sci-Fi",
            Category::Romance => "Romance",
            Category::Thriller => "Thriller",
            Category::Documentary => "Documentary",
            Category::Animation => "Animation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        Category::ALL
            .into_iter()
            .find(|c| normalize_label(c.label()) == key)
            .ok_or_else(|| ReelError::Parse(format!("unknown category '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    WantToWatch,
    Watching,
    Watched,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::WantToWatch, Status::Watching, Status::Watched];

    pub fn label(&self) -> &'static str {
        match self {
            Status::WantToWatch => "Want to watch",
            Status::Watching => "Watching",
            Status::Watched => "Watched",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_label(s);
        Status::ALL
            .into_iter()
            .find(|st| normalize_label(st.label()) == key)
            .ok_or_else(|| ReelError::Parse(format!("unknown status '{}'", s)))
    }
}

/// Lowercase and drop separators so "sci-fi", "SCI_FI" and "Sci Fi" compare equal.
fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
