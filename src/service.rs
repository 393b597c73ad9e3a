use std::sync::Arc;

use crate::error::ReelResult;
use crate::model::movie::{Category, Movie, MovieId, Status};
use crate::notify::{Observer, ObserverId};
use crate::query::{run_query, QueryConfig, SortDirection, SortKey};
use crate::store::catalog::CatalogStore;
use crate::store::gateway::MovieGateway;

// ---------------------------------------------------------------------------
// MovieService: catalog store + current query configuration
// ---------------------------------------------------------------------------

/// Wraps the [`CatalogStore`] with the search/filter/sort selections.
///
/// Changing a selection only updates configuration and notifies observers;
/// the pipeline runs lazily on the next [`MovieService::movies`] call.
#[derive(Debug)]
pub struct MovieService {
    store: CatalogStore,
    query: QueryConfig,
}

impl MovieService {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store,
            query: QueryConfig::default(),
        }
    }

    pub fn open(gateway: Box<dyn MovieGateway>) -> ReelResult<Self> {
        Ok(Self::new(CatalogStore::open(gateway)?))
    }

    /// The catalog as seen through the current query configuration.
    pub fn movies(&self) -> Vec<Movie> {
        run_query(self.store.get_all(), &self.query)
    }

    /// The full, unfiltered catalog in storage order.
    pub fn all(&self) -> &[Movie] {
        self.store.get_all()
    }

    pub fn find(&self, id: MovieId) -> Option<&Movie> {
        self.store.find(id)
    }

    pub fn query(&self) -> &QueryConfig {
        &self.query
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    pub fn set_search(&mut self, term: Option<&str>) -> ReelResult<()> {
        self.query.set_search(term);
        self.changed()
    }

    pub fn set_category_filter(&mut self, category: Option<Category>) -> ReelResult<()> {
        self.query.filter.category = category;
        self.changed()
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) -> ReelResult<()> {
        self.query.filter.status = status;
        self.changed()
    }

    pub fn set_rating_filter(&mut self, rating: Option<u8>) -> ReelResult<()> {
        self.query.filter.rating = rating;
        self.changed()
    }

    pub fn set_sort(&mut self, sort: SortKey) -> ReelResult<()> {
        self.query.sort = sort;
        self.changed()
    }

    pub fn set_direction(&mut self, direction: SortDirection) -> ReelResult<()> {
        self.query.direction = direction;
        self.changed()
    }

    /// Clear search and filters and go back to title ascending, with a
    /// single notification.
    pub fn reset_filters_and_sort(&mut self) -> ReelResult<()> {
        self.query.reset();
        self.changed()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> ObserverId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.store.unsubscribe(id)
    }

    fn changed(&self) -> ReelResult<()> {
        tracing::debug!(query = ?self.query, "Query configuration changed");
        self.store.notify()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
