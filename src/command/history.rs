//! Undo/redo history for catalog commands.
//!
//! Two stacks of executed commands:
//! - `undo_stack` holds commands that are executed and not yet undone
//! - `redo_stack` holds commands that were undone and not yet redone
//!
//! A command lives in at most one stack. Executing a new command clears the
//! redo stack. A failed undo or redo puts the command back where it was, so
//! the stacks always describe what actually happened to the catalog.

use chrono::{DateTime, Utc};

use crate::command::Command;
use crate::error::ReelResult;
use crate::model::movie::Movie;
use crate::store::catalog::CatalogStore;

/// Default number of undo steps kept before the oldest is dropped.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A command on one of the history stacks.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub command: Command,
    /// When the command's forward action last ran.
    pub executed_at: DateTime<Utc>,
}

/// Executes commands against a [`CatalogStore`] and tracks undo/redo history.
#[derive(Debug)]
pub struct CommandManager {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_depth: usize,
}

impl CommandManager {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Keep at most `max_depth` undo steps (at least one).
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Run `command`'s forward action and push it onto the undo stack.
    ///
    /// On success the redo stack is cleared and the produced movie returned.
    /// On failure the command is dropped and the error returned unchanged,
    /// unless the catalog change was already committed (only notification
    /// failed), in which case the command is still recorded.
    pub fn execute(&mut self, mut command: Command, store: &mut CatalogStore) -> ReelResult<Movie> {
        let outcome = command.execute(store);
        match &outcome {
            Ok(_) => {}
            Err(err) if err.mutation_committed() => {}
            Err(err) => {
                tracing::debug!(command = %command, error = %err, "Command failed, not recorded");
                return outcome;
            }
        }

        self.redo_stack.clear();
        self.push_undo(HistoryEntry {
            command,
            executed_at: Utc::now(),
        });
        outcome
    }

    /// Undo the most recent command. Returns `Ok(None)` if there is nothing
    /// to undo.
    pub fn undo(&mut self, store: &mut CatalogStore) -> ReelResult<Option<&Command>> {
        let Some(mut entry) = self.undo_stack.pop() else {
            tracing::debug!("Nothing to undo");
            return Ok(None);
        };

        if let Err(err) = entry.command.undo(store) {
            if err.mutation_committed() {
                self.redo_stack.push(entry);
            } else {
                tracing::warn!(command = %entry.command, error = %err, "Undo failed, history unchanged");
                self.undo_stack.push(entry);
            }
            return Err(err);
        }

        tracing::debug!(
            command = %entry.command,
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len() + 1,
            "Undo"
        );
        self.redo_stack.push(entry);
        Ok(self.redo_stack.last().map(|e| &e.command))
    }

    /// Redo the most recently undone command. Returns `Ok(None)` if there is
    /// nothing to redo.
    pub fn redo(&mut self, store: &mut CatalogStore) -> ReelResult<Option<&Command>> {
        let Some(mut entry) = self.redo_stack.pop() else {
            tracing::debug!("Nothing to redo");
            return Ok(None);
        };

        if let Err(err) = entry.command.execute(store) {
            if err.mutation_committed() {
                entry.executed_at = Utc::now();
                self.push_undo(entry);
            } else {
                tracing::warn!(command = %entry.command, error = %err, "Redo failed, history unchanged");
                self.redo_stack.push(entry);
            }
            return Err(err);
        }

        entry.executed_at = Utc::now();
        tracing::debug!(
            command = %entry.command,
            undo_depth = self.undo_stack.len() + 1,
            redo_depth = self.redo_stack.len(),
            "Redo"
        );
        self.push_undo(entry);
        Ok(self.undo_stack.last().map(|e| &e.command))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Undoable entries, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter().rev()
    }

    /// Redoable entries, next-to-redo first.
    pub fn redo_history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.redo_stack.iter().rev()
    }

    /// Forget all history. The catalog is not touched.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);
        if self.undo_stack.len() > self.max_depth {
            let dropped = self.undo_stack.remove(0);
            tracing::debug!(command = %dropped.command, "History full, dropped oldest entry");
        }
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::error::ReelError;
    use crate::model::input::MovieInput;
    use crate::model::movie::{Category, Status};
    use crate::store::gateway::InMemoryGateway;
    use std::sync::Arc;

    fn input(title: &str, year: &str, rating: i32) -> MovieInput {
        MovieInput::new(title, "Kubrick", year, Category::Drama, Status::Watched, rating)
    }

    fn setup() -> (CommandManager, CatalogStore, InMemoryGateway) {
        let gateway = InMemoryGateway::new();
        let store = CatalogStore::open(Box::new(gateway.clone())).unwrap();
        (CommandManager::new(), store, gateway)
    }

    fn snapshot(store: &CatalogStore) -> Vec<Movie> {
        store.get_all().to_vec()
    }

    fn same(a: &[Movie], b: &[Movie]) -> bool {
        a.len() == b.len() && a.iter().all(|m| b.iter().any(|n| n.same_content(m)))
    }

    #[test]
    fn test_add_undo_redo_keeps_identity() {
        let (mut history, mut store, _) = setup();
        for title in ["A", "B", "C"] {
            history.execute(Command::add(input(title, "1970", 3)), &mut store).unwrap();
        }
        let before = snapshot(&store);

        let d = history.execute(Command::add(input("D", "1971", 4)), &mut store).unwrap();
        assert_eq!(store.len(), 4);
        assert!(store.find(d.id()).unwrap().same_content(&d));

        let undone = history.undo(&mut store).unwrap().unwrap();
        assert_eq!(undone.kind(), CommandKind::Add);
        assert_eq!(store.len(), 3);
        assert!(!store.contains(d.id()));
        assert!(same(&snapshot(&store), &before));

        history.redo(&mut store).unwrap().unwrap();
        assert_eq!(store.len(), 4);
        assert!(store.find(d.id()).unwrap().same_content(&d));
    }

    #[test]
    fn test_edit_undo_restores_exact_original() {
        let (mut history, mut store, _) = setup();
        let original = history
            .execute(Command::add(input("Barry Lyndon", "1975", 4)), &mut store)
            .unwrap();

        let updated = history
            .execute(
                Command::edit(original.clone(), input("Barry Lyndon (remaster)", "1976", 5)),
                &mut store,
            )
            .unwrap();
        assert_eq!(updated.id(), original.id());
        assert_eq!(store.find(original.id()).unwrap().rating(), 5);

        history.undo(&mut store).unwrap();
        assert!(store.find(original.id()).unwrap().same_content(&original));

        history.redo(&mut store).unwrap();
        assert!(store.find(original.id()).unwrap().same_content(&updated));
    }

    #[test]
    fn test_delete_undo_reinstates_equal_movie() {
        let (mut history, mut store, _) = setup();
        let movie = history
            .execute(Command::add(input("The Shining", "1980", 5)), &mut store)
            .unwrap();
        let after_add = snapshot(&store);

        history.execute(Command::delete(movie.clone()), &mut store).unwrap();
        assert!(store.is_empty());
        let after_delete = snapshot(&store);

        let undone = history.undo(&mut store).unwrap().unwrap();
        assert_eq!(undone.focus_after_undo(), Some(movie.id()));
        assert!(same(&snapshot(&store), &after_add));

        history.redo(&mut store).unwrap();
        assert!(same(&snapshot(&store), &after_delete));
    }

    #[test]
    fn test_execute_clears_redo() {
        let (mut history, mut store, _) = setup();
        history.execute(Command::add(input("A", "1960", 1)), &mut store).unwrap();
        history.undo(&mut store).unwrap();
        assert!(history.can_redo());

        history.execute(Command::add(input("B", "1961", 2)), &mut store).unwrap();
        assert!(!history.can_redo());
        assert!(history.redo(&mut store).unwrap().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all()[0].title(), "B");
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let (mut history, mut store, gateway) = setup();
        assert!(history.undo(&mut store).unwrap().is_none());
        assert!(history.redo(&mut store).unwrap().is_none());
        assert_eq!(gateway.save_count(), 0);
    }

    #[test]
    fn test_failed_execute_is_not_recorded_and_keeps_redo() {
        let (mut history, mut store, _) = setup();
        history.execute(Command::add(input("A", "1960", 1)), &mut store).unwrap();
        history.undo(&mut store).unwrap();

        let err = history
            .execute(Command::add(input("B", "not a year", 2)), &mut store)
            .unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)));
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 1);
    }

    #[test]
    fn test_failed_persist_leaves_history_and_catalog_unchanged() {
        let (mut history, mut store, gateway) = setup();
        let movie = history
            .execute(Command::add(input("Spartacus", "1960", 4)), &mut store)
            .unwrap();

        gateway.fail_saves(true);
        let err = history.undo(&mut store).unwrap_err();
        assert!(matches!(err, ReelError::Persistence(_)));
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
        assert!(store.contains(movie.id()));

        assert!(history.execute(Command::delete(movie.clone()), &mut store).is_err());
        assert_eq!(history.undo_depth(), 1);
        assert!(store.contains(movie.id()));

        gateway.fail_saves(false);
        history.undo(&mut store).unwrap();
        assert!(store.is_empty());
        assert_eq!(history.redo_depth(), 1);
    }

    #[test]
    fn test_failed_redo_stays_on_redo_stack() {
        let (mut history, mut store, gateway) = setup();
        history.execute(Command::add(input("Lolita", "1962", 3)), &mut store).unwrap();
        history.undo(&mut store).unwrap();

        gateway.fail_saves(true);
        assert!(history.redo(&mut store).is_err());
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.undo_depth(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_observer_failure_still_records_command() {
        let (mut history, mut store, _) = setup();
        store.subscribe(Arc::new(|| -> ReelResult<()> {
            Err(ReelError::Observer("table disposed".to_string()))
        }));

        let err = history
            .execute(Command::add(input("Paths of Glory", "1957", 5)), &mut store)
            .unwrap_err();
        assert!(matches!(err, ReelError::Observer(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(history.undo_depth(), 1);

        assert!(history.undo(&mut store).is_err());
        assert!(store.is_empty());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 1);
    }

    #[test]
    fn test_max_depth_drops_oldest() {
        let (_, mut store, _) = setup();
        let mut history = CommandManager::with_max_depth(2);
        for title in ["One", "Two", "Three"] {
            history.execute(Command::add(input(title, "2000", 3)), &mut store).unwrap();
        }

        assert_eq!(history.undo_depth(), 2);
        let labels: Vec<String> = history.history().map(|e| e.command.label()).collect();
        assert_eq!(labels, vec!["Add \"Three\"", "Add \"Two\""]);

        history.undo(&mut store).unwrap();
        history.undo(&mut store).unwrap();
        assert!(history.undo(&mut store).unwrap().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all()[0].title(), "One");
    }

    #[test]
    fn test_command_never_sits_in_both_stacks() {
        let (mut history, mut store, _) = setup();
        history.execute(Command::add(input("A", "2000", 3)), &mut store).unwrap();
        history.execute(Command::add(input("B", "2001", 3)), &mut store).unwrap();

        history.undo(&mut store).unwrap();
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 1));
        history.undo(&mut store).unwrap();
        assert_eq!((history.undo_depth(), history.redo_depth()), (0, 2));
        history.redo(&mut store).unwrap();
        assert_eq!((history.undo_depth(), history.redo_depth()), (1, 1));
        assert_eq!(history.redo_history().next().unwrap().command.label(), "Add \"B\"");
    }
}
