use crate::{error::AppResult, models::SearchResult, services::filter::Predicate};

pub mod cosmos;
pub mod memory;

pub use cosmos::{CosmosStore, DistanceFunction};
pub use memory::InMemoryStore;

/// A top-K nearest-neighbour request against the movie collection
#[derive(Debug, Clone, PartialEq)]
pub struct NearestQuery {
    pub embedding: Vec<f32>,
    pub limit: usize,
    /// Records failing the predicate are not eligible for ranking
    pub predicate: Option<Predicate>,
}

/// Read-only access to the backend movie store
///
/// Implementations are long-lived handles shared across requests; they
/// must not hold per-request mutable state. Any communication failure is
/// reported as `AppError::BackendQuery`, never as an empty result.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Up to `limit` records ordered by ascending vector distance
    async fn nearest(&self, query: NearestQuery) -> AppResult<Vec<SearchResult>>;

    /// Stored embedding of the first record whose title matches exactly
    async fn embedding_for_title(&self, title: &str) -> AppResult<Option<Vec<f32>>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
