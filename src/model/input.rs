use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::model::movie::{Category, Movie, Status};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Raw, unvalidated movie fields as they arrive from a form or CLI.
/// Carries no identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub director: String,
    /// Year as typed, not yet parsed.
    pub year_text: String,
    pub category: Category,
    pub status: Status,
    pub rating: i32,
}

impl MovieInput {
    pub fn new(
        title: impl Into<String>,
        director: impl Into<String>,
        year_text: impl Into<String>,
        category: Category,
        status: Status,
        rating: i32,
    ) -> Self {
        Self {
            title: title.into(),
            director: director.into(),
            year_text: year_text.into(),
            category,
            status,
            rating,
        }
    }

    /// Pre-fill an input from an existing movie, e.g. to edit a subset of fields.
    pub fn from_movie(movie: &Movie) -> Self {
        Self {
            title: movie.title().to_string(),
            director: movie.director().to_string(),
            year_text: movie.year().to_string(),
            category: movie.category(),
            status: movie.status(),
            rating: i32::from(movie.rating()),
        }
    }

    /// Check the input and convert it into movie-ready fields.
    ///
    /// Title and director must be non-blank, the year must parse as an
    /// integer and the rating must lie in `1..=5`. Text fields are trimmed.
    pub fn validate(&self) -> ReelResult<MovieDraft> {
        let title = self.title.trim();
        let director = self.director.trim();
        let year_text = self.year_text.trim();

        if title.is_empty() || director.is_empty() || year_text.is_empty() {
            return Err(ReelError::Validation(
                "title, director and year cannot be empty".to_string(),
            ));
        }

        let year: i32 = year_text.parse().map_err(|_| {
            ReelError::Validation(format!("year must be a valid number, got '{}'", year_text))
        })?;

        let rating = u8::try_from(self.rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                ReelError::Validation(format!(
                    "rating must be between {} and {}, got {}",
                    MIN_RATING, MAX_RATING, self.rating
                ))
            })?;

        Ok(MovieDraft {
            title: title.to_string(),
            director: director.to_string(),
            year,
            rating,
            category: self.category,
            status: self.status,
        })
    }
}

/// Validated movie fields, ready to become a [`Movie`] under some id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDraft {
    pub title: String,
    pub director: String,
    pub year: i32,
    pub rating: u8,
    pub category: Category,
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, director: &str, year: &str, rating: i32) -> MovieInput {
        MovieInput::new(title, director, year, Category::Action, Status::Watched, rating)
    }

    #[test]
    fn test_valid_input_is_trimmed() {
        let draft = input("  Heat ", " Michael Mann", " 1995 ", 5).validate().unwrap();
        assert_eq!(draft.title, "Heat");
        assert_eq!(draft.director, "Michael Mann");
        assert_eq!(draft.year, 1995);
        assert_eq!(draft.rating, 5);
    }

    #[test]
    fn test_blank_fields_are_rejected() {
        assert!(matches!(
            input("   ", "Mann", "1995", 3).validate(),
            Err(ReelError::Validation(_))
        ));
        assert!(matches!(
            input("Heat", "", "1995", 3).validate(),
            Err(ReelError::Validation(_))
        ));
        assert!(matches!(
            input("Heat", "Mann", "", 3).validate(),
            Err(ReelError::Validation(_))
        ));
    }

    #[test]
    fn test_non_numeric_year_is_rejected() {
        let err = input("Heat", "Mann", "nineteen", 3).validate().unwrap_err();
        assert!(err.to_string().contains("year must be a valid number"));
    }

    #[test]
    fn test_rating_out_of_range_is_rejected() {
        assert!(input("Heat", "Mann", "1995", 0).validate().is_err());
        assert!(input("Heat", "Mann", "1995", 6).validate().is_err());
        assert!(input("Heat", "Mann", "1995", -1).validate().is_err());
        assert!(input("Heat", "Mann", "1995", 1).validate().is_ok());
    }

    #[test]
    fn test_from_movie_round_trips_through_validation() {
        let movie = Movie::create(input("Heat", "Mann", "1995", 4).validate().unwrap());
        let draft = MovieInput::from_movie(&movie).validate().unwrap();
        assert!(movie.revise(draft).same_content(&movie));
    }
}
