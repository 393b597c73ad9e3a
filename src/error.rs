use thiserror::Error;

use crate::model::movie::MovieId;

/// Central error type for catalog operations.
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Movie not found: {0}")]
    NotFound(MovieId),

    #[error("Duplicate movie ID: {0}")]
    DuplicateMovie(MovieId),

    #[error("Invalid undo state: {0}")]
    UndoState(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Observer failed: {0}")]
    Observer(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Convenience type alias for catalog results.
pub type ReelResult<T> = Result<T, ReelError>;

impl ReelError {
    /// Whether the catalog change behind this error was already persisted.
    ///
    /// Only notification failures qualify: the store saves before it
    /// notifies, so an observer error means the mutation itself succeeded.
    pub fn mutation_committed(&self) -> bool {
        matches!(self, ReelError::Observer(_))
    }
}
