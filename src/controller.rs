use std::sync::Arc;

use crate::command::{Command, CommandManager, HistoryEntry};
use crate::error::{ReelError, ReelResult};
use crate::model::input::MovieInput;
use crate::model::movie::{Category, Movie, MovieId, Status};
use crate::notify::{Observer, ObserverId};
use crate::query::{QueryConfig, SortDirection, SortKey};
use crate::service::MovieService;

// ---------------------------------------------------------------------------
// MovieController: command/query API for presentation layers
// ---------------------------------------------------------------------------

/// The single entry point a presentation layer talks to.
///
/// Mutations are validated here, wrapped in a [`Command`] and run through the
/// [`CommandManager`], which is the only path that changes the catalog.
/// Reads and query configuration go straight to the [`MovieService`].
#[derive(Debug)]
pub struct MovieController {
    service: MovieService,
    commands: CommandManager,
}

impl MovieController {
    pub fn new(service: MovieService, commands: CommandManager) -> Self {
        Self { service, commands }
    }

    /// Validate `input` and add it as a new movie. Returns the created movie.
    pub fn add_movie(&mut self, input: MovieInput) -> ReelResult<Movie> {
        input.validate()?;
        self.commands
            .execute(Command::add(input), self.service.store_mut())
    }

    /// Validate `input` and apply it to the movie with `id`.
    pub fn edit_movie(&mut self, id: MovieId, input: MovieInput) -> ReelResult<Movie> {
        input.validate()?;
        let original = self.find(id).cloned().ok_or(ReelError::NotFound(id))?;
        self.commands
            .execute(Command::edit(original, input), self.service.store_mut())
    }

    /// Delete the movie with `id`. Returns the removed movie.
    pub fn delete_movie(&mut self, id: MovieId) -> ReelResult<Movie> {
        let target = self.find(id).cloned().ok_or(ReelError::NotFound(id))?;
        self.commands
            .execute(Command::delete(target), self.service.store_mut())
    }

    /// Undo the last command, returning it so the caller can react to its
    /// variant. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self) -> ReelResult<Option<&Command>> {
        self.commands.undo(self.service.store_mut())
    }

    /// Redo the last undone command. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self) -> ReelResult<Option<&Command>> {
        self.commands.redo(self.service.store_mut())
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Undoable commands, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.commands.history()
    }

    /// Undone commands, next to redo first.
    pub fn redo_history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.commands.redo_history()
    }

    /// The catalog filtered and sorted by the current configuration.
    pub fn movies(&self) -> Vec<Movie> {
        self.service.movies()
    }

    /// The unfiltered catalog.
    pub fn all_movies(&self) -> &[Movie] {
        self.service.all()
    }

    pub fn find(&self, id: MovieId) -> Option<&Movie> {
        self.service.find(id)
    }

    pub fn query(&self) -> &QueryConfig {
        self.service.query()
    }

    pub fn search(&mut self, term: Option<&str>) -> ReelResult<()> {
        self.service.set_search(term)
    }

    pub fn set_category_filter(&mut self, category: Option<Category>) -> ReelResult<()> {
        self.service.set_category_filter(category)
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) -> ReelResult<()> {
        self.service.set_status_filter(status)
    }

    pub fn set_rating_filter(&mut self, rating: Option<u8>) -> ReelResult<()> {
        self.service.set_rating_filter(rating)
    }

    pub fn set_sort(&mut self, sort: SortKey) -> ReelResult<()> {
        self.service.set_sort(sort)
    }

    pub fn set_direction(&mut self, direction: SortDirection) -> ReelResult<()> {
        self.service.set_direction(direction)
    }

    pub fn reset_filters_and_sort(&mut self) -> ReelResult<()> {
        self.service.reset_filters_and_sort()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        self.service.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.service.unsubscribe(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandKind;
    use crate::store::gateway::InMemoryGateway;

    fn controller() -> (MovieController, InMemoryGateway) {
        let gateway = InMemoryGateway::new();
        let service = MovieService::open(Box::new(gateway.clone())).unwrap();
        (MovieController::new(service, CommandManager::new()), gateway)
    }

    fn input(title: &str, year: &str) -> MovieInput {
        MovieInput::new(title, "Varda", year, Category::Documentary, Status::WantToWatch, 4)
    }

    #[test]
    fn test_validation_error_never_reaches_history() {
        let (mut controller, gateway) = controller();

        let err = controller.add_movie(input("", "1962")).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)));
        assert!(!controller.can_undo());
        assert_eq!(gateway.save_count(), 0);

        let movie = controller.add_movie(input("Cléo from 5 to 7", "1962")).unwrap();
        let err = controller.edit_movie(movie.id(), input("Cléo", "sixty-two")).unwrap_err();
        assert!(matches!(err, ReelError::Validation(_)));
        assert_eq!(controller.history().count(), 1);
    }

    #[test]
    fn test_edit_and_delete_unknown_id() {
        let (mut controller, _) = controller();
        let ghost = MovieId::new();
        assert!(matches!(
            controller.edit_movie(ghost, input("Vagabond", "1985")),
            Err(ReelError::NotFound(id)) if id == ghost
        ));
        assert!(matches!(controller.delete_movie(ghost), Err(ReelError::NotFound(_))));
        assert!(!controller.can_undo());
    }

    #[test]
    fn test_undo_redo_report_the_command() {
        let (mut controller, _) = controller();
        let movie = controller.add_movie(input("Vagabond", "1985")).unwrap();
        controller.delete_movie(movie.id()).unwrap();

        match controller.undo().unwrap() {
            Some(Command::Delete { target, .. }) => assert_eq!(target.id(), movie.id()),
            other => panic!("expected delete, got {:?}", other),
        }
        assert!(controller.find(movie.id()).is_some());

        let redone = controller.redo().unwrap().map(Command::kind);
        assert_eq!(redone, Some(CommandKind::Delete));
        assert!(controller.find(movie.id()).is_none());
    }

    #[test]
    fn test_add_returns_validated_movie() {
        let (mut controller, gateway) = controller();
        let movie = controller
            .add_movie(MovieInput::new(
                "  The Gleaners and I ",
                " Agnès Varda ",
                " 2000 ",
                Category::Documentary,
                Status::Watched,
                5,
            ))
            .unwrap();

        assert_eq!(movie.title(), "The Gleaners and I");
        assert_eq!(movie.director(), "Agnès Varda");
        assert_eq!(movie.year(), 2000);
        assert_eq!(gateway.snapshot().len(), 1);
        assert_eq!(controller.movies().len(), 1);
    }
}
