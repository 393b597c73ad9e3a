use std::sync::Arc;

use crate::error::{ReelError, ReelResult};
use crate::model::movie::{Movie, MovieId};
use crate::notify::{ChangeNotifier, Observer, ObserverId};
use crate::store::gateway::MovieGateway;

// ---------------------------------------------------------------------------
// CatalogStore: the authoritative in-memory collection
// ---------------------------------------------------------------------------

/// Owns the live movie collection.
///
/// Every mutation runs the same sequence: change the collection, save the
/// whole collection through the gateway, then notify observers. If the save
/// fails, the change is rolled back and observers are not notified, so the
/// in-memory collection never drifts from the persisted snapshot.
///
/// Callers only ever get shared borrows or clones of the movies; nothing
/// outside the store can hold a mutable reference into the collection.
pub struct CatalogStore {
    movies: Vec<Movie>,
    gateway: Box<dyn MovieGateway>,
    notifier: ChangeNotifier,
}

/// A mutation that has been applied in memory but not yet persisted.
#[derive(Debug)]
enum AppliedChange {
    Added(MovieId),
    Replaced { index: usize, previous: Movie },
    Removed { index: usize, movie: Movie },
}

impl CatalogStore {
    /// Load the catalog from `gateway`.
    pub fn open(gateway: Box<dyn MovieGateway>) -> ReelResult<Self> {
        let movies = gateway.load_all()?;
        tracing::info!(count = movies.len(), "Catalog loaded");
        Ok(Self {
            movies,
            gateway,
            notifier: ChangeNotifier::new(),
        })
    }

    /// The full, unfiltered collection in storage order.
    pub fn get_all(&self) -> &[Movie] {
        &self.movies
    }

    pub fn find(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id() == id)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Append an already-validated movie.
    pub fn add(&mut self, movie: Movie) -> ReelResult<()> {
        let id = movie.id();
        if self.contains(id) {
            return Err(ReelError::DuplicateMovie(id));
        }

        self.movies.push(movie);
        self.commit(AppliedChange::Added(id))?;
        tracing::info!(%id, count = self.movies.len(), "Movie added");
        Ok(())
    }

    /// Substitute the movie with `id`. Returns the value it replaced.
    pub fn replace(&mut self, id: MovieId, movie: Movie) -> ReelResult<Movie> {
        if movie.id() != id {
            return Err(ReelError::Validation(format!(
                "replacement for {} carries a different id ({})",
                id,
                movie.id()
            )));
        }
        let index = self.position(id).ok_or(ReelError::NotFound(id))?;

        let previous = std::mem::replace(&mut self.movies[index], movie);
        self.commit(AppliedChange::Replaced {
            index,
            previous: previous.clone(),
        })?;
        tracing::info!(%id, "Movie replaced");
        Ok(previous)
    }

    /// Remove the movie with `id`, returning it.
    ///
    /// Removing an absent id is a no-op: nothing is saved or notified and
    /// `Ok(None)` is returned.
    pub fn remove_by_id(&mut self, id: MovieId) -> ReelResult<Option<Movie>> {
        let Some(index) = self.position(id) else {
            tracing::debug!(%id, "Remove skipped, movie not present");
            return Ok(None);
        };

        let movie = self.movies.remove(index);
        self.commit(AppliedChange::Removed {
            index,
            movie: movie.clone(),
        })?;
        tracing::info!(%id, count = self.movies.len(), "Movie removed");
        Ok(Some(movie))
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Notify every observer without mutating anything, e.g. after a query
    /// configuration change.
    pub fn notify(&self) -> ReelResult<()> {
        self.notifier.notify_all()
    }

    fn position(&self, id: MovieId) -> Option<usize> {
        self.movies.iter().position(|m| m.id() == id)
    }

    /// Persist the collection, rolling `change` back if the gateway refuses,
    /// then notify.
    fn commit(&mut self, change: AppliedChange) -> ReelResult<()> {
        if let Err(err) = self.gateway.save_all(&self.movies) {
            tracing::warn!(error = %err, ?change, "Save failed, rolling back catalog change");
            self.rollback(change);
            return Err(err);
        }
        self.notifier.notify_all()
    }

    fn rollback(&mut self, change: AppliedChange) {
        match change {
            AppliedChange::Added(id) => {
                self.movies.retain(|m| m.id() != id);
            }
            AppliedChange::Replaced { index, previous } => {
                self.movies[index] = previous;
            }
            AppliedChange::Removed { index, movie } => {
                self.movies.insert(index, movie);
            }
        }
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("movies", &self.movies.len())
            .field("notifier", &self.notifier)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
