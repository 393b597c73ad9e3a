pub mod history;

pub use history::{CommandManager, HistoryEntry, DEFAULT_MAX_DEPTH};

use std::fmt;

use crate::error::{ReelError, ReelResult};
use crate::model::input::MovieInput;
use crate::model::movie::{Movie, MovieId};
use crate::store::catalog::CatalogStore;

// ---------------------------------------------------------------------------
// Command: a reversible catalog mutation
// ---------------------------------------------------------------------------

/// A reversible unit of catalog mutation.
///
/// Each variant holds only values (inputs and movie snapshots), never
/// references into the store. The `Option<Movie>` fields are mementos that
/// a successful forward action fills in and the inverse action relies on.
#[derive(Debug, Clone)]
pub enum Command {
    Add {
        input: MovieInput,
        /// The movie created on first execution; redo re-inserts it so the
        /// id stays the same.
        created: Option<Movie>,
    },
    Edit {
        /// Value before the edit, captured when the command is built.
        original: Movie,
        input: MovieInput,
        updated: Option<Movie>,
    },
    Delete {
        target: Movie,
        /// The exact value taken out of the catalog.
        removed: Option<Movie>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Add,
    Edit,
    Delete,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CommandKind::Add => "add",
            CommandKind::Edit => "edit",
            CommandKind::Delete => "delete",
        })
    }
}

impl Command {
    pub fn add(input: MovieInput) -> Self {
        Command::Add {
            input,
            created: None,
        }
    }

    pub fn edit(original: Movie, input: MovieInput) -> Self {
        Command::Edit {
            original,
            input,
            updated: None,
        }
    }

    pub fn delete(target: Movie) -> Self {
        Command::Delete {
            target,
            removed: None,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Add { .. } => CommandKind::Add,
            Command::Edit { .. } => CommandKind::Edit,
            Command::Delete { .. } => CommandKind::Delete,
        }
    }

    /// Id of the movie this command acts on, once known.
    pub fn movie_id(&self) -> Option<MovieId> {
        match self {
            Command::Add { created, .. } => created.as_ref().map(Movie::id),
            Command::Edit { original, .. } => Some(original.id()),
            Command::Delete { target, .. } => Some(target.id()),
        }
    }

    /// Which movie a view should select after this command was undone.
    pub fn focus_after_undo(&self) -> Option<MovieId> {
        match self {
            Command::Add { .. } => None,
            Command::Edit { original, .. } => Some(original.id()),
            Command::Delete { target, .. } => Some(target.id()),
        }
    }

    /// Which movie a view should select after this command was redone.
    pub fn focus_after_redo(&self) -> Option<MovieId> {
        match self {
            Command::Add { created, .. } => created.as_ref().map(Movie::id),
            Command::Edit { original, .. } => Some(original.id()),
            Command::Delete { .. } => None,
        }
    }

    /// Short human description, e.g. `Add "Heat"`.
    pub fn label(&self) -> String {
        match self {
            Command::Add { input, .. } => format!("Add \"{}\"", input.title.trim()),
            Command::Edit { original, .. } => format!("Edit \"{}\"", original.title()),
            Command::Delete { target, .. } => format!("Delete \"{}\"", target.title()),
        }
    }

    /// Run the forward action and record its memento. Returns the movie the
    /// action produced (created, updated or removed).
    pub(crate) fn execute(&mut self, store: &mut CatalogStore) -> ReelResult<Movie> {
        match self {
            Command::Add { input, created } => {
                let movie = match created {
                    Some(movie) => movie.clone(),
                    None => Movie::create(input.validate()?),
                };
                let outcome = store.add(movie.clone());
                record(outcome, created, movie)
            }
            Command::Edit {
                original,
                input,
                updated,
            } => {
                let id = original.id();
                let revised = match updated {
                    Some(movie) => movie.clone(),
                    None => {
                        let current = store.find(id).ok_or(ReelError::NotFound(id))?;
                        current.revise(input.validate()?)
                    }
                };
                let outcome = store.replace(id, revised.clone());
                record(outcome, updated, revised)
            }
            Command::Delete { target, removed } => {
                let id = target.id();
                let current = store.find(id).cloned().ok_or(ReelError::NotFound(id))?;
                let outcome = store.remove_by_id(id);
                record(outcome, removed, current)
            }
        }
    }

    /// Run the inverse action. Fails with `UndoState` if the forward action
    /// never completed.
    pub(crate) fn undo(&mut self, store: &mut CatalogStore) -> ReelResult<()> {
        match self {
            Command::Add { created, .. } => {
                let id = created.as_ref().map(Movie::id).ok_or_else(|| {
                    ReelError::UndoState("add was never executed; no movie to remove".to_string())
                })?;
                match store.remove_by_id(id)? {
                    Some(_) => Ok(()),
                    None => Err(ReelError::NotFound(id)),
                }
            }
            Command::Edit {
                original, updated, ..
            } => {
                if updated.is_none() {
                    return Err(ReelError::UndoState(
                        "edit was never executed; nothing to restore".to_string(),
                    ));
                }
                store.replace(original.id(), original.clone()).map(|_| ())
            }
            Command::Delete { removed, .. } => {
                let movie = removed.as_ref().ok_or_else(|| {
                    ReelError::UndoState("delete was never executed; nothing to reinsert".to_string())
                })?;
                store.add(movie.clone())
            }
        }
    }
}

/// Store the memento when the catalog change went through, including the
/// case where only notification failed afterwards.
fn record<T>(outcome: ReelResult<T>, memento: &mut Option<Movie>, movie: Movie) -> ReelResult<Movie> {
    match outcome {
        Ok(_) => {
            *memento = Some(movie.clone());
            Ok(movie)
        }
        Err(err) => {
            if err.mutation_committed() {
                *memento = Some(movie);
            }
            Err(err)
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
