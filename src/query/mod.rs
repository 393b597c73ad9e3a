use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ReelError;
use crate::model::movie::{Category, Movie, Status};

// ---------------------------------------------------------------------------
// Query configuration: search, filter, sort selections applied on read
// ---------------------------------------------------------------------------

/// The current read configuration. `Default` is "no search, no filters,
/// title ascending".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryConfig {
    /// Case-insensitive substring matched against title or director.
    pub search: Option<String>,
    /// Field constraints, combined with logical AND.
    pub filter: MovieFilter,
    /// Which comparator orders the result.
    pub sort: SortKey,
    /// Whether the comparator's ordering is reversed.
    pub direction: SortDirection,
}

impl QueryConfig {
    /// Set the search term. Blank terms clear the search; others are trimmed.
    pub fn set_search(&mut self, term: Option<&str>) {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }

    /// Restore defaults: no search, no filters, title ascending.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-field constraints. `None` matches everything for that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub rating: Option<u8>,
}

impl MovieFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        self.category.map_or(true, |c| movie.category() == c)
            && self.status.map_or(true, |s| movie.status() == s)
            && self.rating.map_or(true, |r| movie.rating() == r)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.status.is_none() && self.rating.is_none()
    }
}

// ---------------------------------------------------------------------------
// Sort strategies
// ---------------------------------------------------------------------------

/// A comparator over movies. Direction is applied by the pipeline, so
/// strategies always describe ascending order.
pub trait SortStrategy {
    fn compare(&self, a: &Movie, b: &Movie) -> Ordering;
}

/// Case-insensitive lexicographic title order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByTitle;

impl SortStrategy for ByTitle {
    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        a.title()
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.title().chars().flat_map(char::to_lowercase))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByYear;

impl SortStrategy for ByYear {
    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        a.year().cmp(&b.year())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ByRating;

impl SortStrategy for ByRating {
    fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        a.rating().cmp(&b.rating())
    }
}

/// Selectable built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Title,
    Year,
    Rating,
}

impl SortKey {
    pub fn strategy(&self) -> &'static dyn SortStrategy {
        match self {
            SortKey::Title => &ByTitle,
            SortKey::Year => &ByYear,
            SortKey::Rating => &ByRating,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Title => "title",
            SortKey::Year => "year",
            SortKey::Rating => "rating",
        })
    }
}

impl FromStr for SortKey {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "year" => Ok(SortKey::Year),
            "rating" => Ok(SortKey::Rating),
            other => Err(ReelError::Parse(format!(
                "unknown sort key '{}'; expected title, year or rating",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        })
    }
}

impl FromStr for SortDirection {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(ReelError::Parse(format!(
                "unknown sort direction '{}'; expected asc or desc",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline: search -> filter -> sort
// ---------------------------------------------------------------------------

/// Run the read pipeline over a catalog snapshot.
///
/// Stages always run in the same order: search, then filter, then a stable
/// sort. The snapshot is never touched; a new sequence is returned.
pub fn run_query(movies: &[Movie], config: &QueryConfig) -> Vec<Movie> {
    let mut selected = search(movies, config.search.as_deref());
    selected.retain(|m| config.filter.matches(m));
    sort(&mut selected, config.sort.strategy(), config.direction);

    tracing::debug!(
        total = movies.len(),
        matched = selected.len(),
        sort = %config.sort,
        direction = %config.direction,
        "Query executed"
    );

    selected.into_iter().cloned().collect()
}

/// Keep movies whose title or director contains `term`, ignoring case.
/// `None` keeps everything.
pub fn search<'a>(movies: &'a [Movie], term: Option<&str>) -> Vec<&'a Movie> {
    match term {
        None => movies.iter().collect(),
        Some(term) => {
            let needle = term.to_lowercase();
            movies
                .iter()
                .filter(|m| {
                    m.title().to_lowercase().contains(&needle)
                        || m.director().to_lowercase().contains(&needle)
                })
                .collect()
        }
    }
}

/// Stable sort; equal movies keep their incoming relative order in both
/// directions.
pub fn sort(movies: &mut [&Movie], strategy: &dyn SortStrategy, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => movies.sort_by(|a, b| strategy.compare(a, b)),
        SortDirection::Descending => movies.sort_by(|a, b| strategy.compare(a, b).reverse()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::input::MovieInput;

    fn movie(title: &str, director: &str, year: i32, rating: i32, category: Category) -> Movie {
        Movie::create(
            MovieInput::new(
                title,
                director,
                year.to_string(),
                category,
                Status::Watched,
                rating,
            )
            .validate()
            .unwrap(),
        )
    }

    fn catalog() -> Vec<Movie> {
        vec![
            movie("A-Title", "DirectorA", 2000, 5, Category::Action),
            movie("B-Title", "DirectorB", 2020, 1, Category::Comedy),
            movie("C-Title", "DirectorC", 2010, 3, Category::Action),
        ]
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title()).collect()
    }

    #[test]
    fn test_default_is_title_ascending() {
        let result = run_query(&catalog(), &QueryConfig::default());
        assert_eq!(titles(&result), vec!["A-Title", "B-Title", "C-Title"]);
    }

    #[test]
    fn test_rating_descending() {
        let config = QueryConfig {
            sort: SortKey::Rating,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let result = run_query(&catalog(), &config);
        assert_eq!(titles(&result), vec!["A-Title", "C-Title", "B-Title"]);
    }

    #[test]
    fn test_filter_then_year_sort() {
        let config = QueryConfig {
            filter: MovieFilter {
                category: Some(Category::Action),
                ..Default::default()
            },
            sort: SortKey::Year,
            ..Default::default()
        };
        let result = run_query(&catalog(), &config);
        assert_eq!(titles(&result), vec!["A-Title", "C-Title"]);
    }

    #[test]
    fn test_search_matches_title_or_director_ignoring_case() {
        let movies = catalog();
        assert_eq!(search(&movies, Some("b-title")).len(), 1);
        assert_eq!(search(&movies, Some("DIRECTORC"))[0].title(), "C-Title");
        assert_eq!(search(&movies, Some("title")).len(), 3);
        assert!(search(&movies, Some("zzz")).is_empty());
    }

    #[test]
    fn test_filters_commute() {
        let movies = vec![
            movie("One", "X", 2001, 3, Category::Action),
            movie("Two", "X", 2002, 3, Category::Drama),
            movie("Three", "X", 2003, 4, Category::Action),
            movie("Four", "X", 2004, 3, Category::Action).with_status(Status::Watching),
        ];
        let full = MovieFilter {
            category: Some(Category::Action),
            status: Some(Status::Watched),
            rating: Some(3),
        };
        let by_all: Vec<_> = movies.iter().filter(|m| full.matches(m)).collect();

        let category = MovieFilter { category: full.category, ..Default::default() };
        let status = MovieFilter { status: full.status, ..Default::default() };
        let rating = MovieFilter { rating: full.rating, ..Default::default() };

        let forward: Vec<_> = movies
            .iter()
            .filter(|m| category.matches(m))
            .filter(|m| status.matches(m))
            .filter(|m| rating.matches(m))
            .collect();
        let backward: Vec<_> = movies
            .iter()
            .filter(|m| rating.matches(m))
            .filter(|m| status.matches(m))
            .filter(|m| category.matches(m))
            .collect();

        assert_eq!(by_all, forward);
        assert_eq!(forward, backward);
        assert_eq!(by_all.len(), 1);
        assert_eq!(by_all[0].title(), "One");
    }

    #[test]
    fn test_sort_is_stable_in_both_directions() {
        let movies = vec![
            movie("First", "X", 1990, 4, Category::Drama),
            movie("Second", "X", 1990, 2, Category::Drama),
            movie("Third", "X", 1990, 4, Category::Drama),
        ];
        let asc = run_query(
            &movies,
            &QueryConfig { sort: SortKey::Year, ..Default::default() },
        );
        assert_eq!(titles(&asc), vec!["First", "Second", "Third"]);

        let desc = run_query(
            &movies,
            &QueryConfig {
                sort: SortKey::Rating,
                direction: SortDirection::Descending,
                ..Default::default()
            },
        );
        assert_eq!(titles(&desc), vec!["First", "Third", "Second"]);
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let movies = vec![
            movie("beta", "X", 2000, 1, Category::Drama),
            movie("Alpha", "X", 2000, 1, Category::Drama),
            movie("Gamma", "X", 2000, 1, Category::Drama),
        ];
        let result = run_query(&movies, &QueryConfig::default());
        assert_eq!(titles(&result), vec!["Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_blank_search_clears_and_reset_restores_defaults() {
        let mut config = QueryConfig::default();
        config.set_search(Some("  heat "));
        assert_eq!(config.search.as_deref(), Some("heat"));
        config.set_search(Some("   "));
        assert!(config.search.is_none());

        config.filter.rating = Some(2);
        config.sort = SortKey::Year;
        config.direction = SortDirection::Descending;
        assert!(!config.is_default());
        config.reset();
        assert!(config.is_default());
    }

    #[test]
    fn test_pipeline_leaves_snapshot_untouched() {
        let movies = catalog();
        let before: Vec<_> = movies.iter().map(|m| m.id()).collect();
        let config = QueryConfig {
            sort: SortKey::Rating,
            direction: SortDirection::Descending,
            ..Default::default()
        };
        let _ = run_query(&movies, &config);
        let after: Vec<_> = movies.iter().map(|m| m.id()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("Rating".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!("length".parse::<SortKey>().is_err());
    }
}
