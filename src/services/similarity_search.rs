use std::sync::Arc;
use std::time::Instant;

use crate::{
    db::{MovieStore, NearestQuery},
    error::{AppError, AppResult},
    models::{SearchFilters, SearchResult},
    services::{filter::FilterBuilder, providers::EmbeddingProvider},
};

/// Default cap on `top_k` when none is configured
pub const DEFAULT_MAX_TOP_K: usize = 50;

/// Vector similarity search over the movie collection
///
/// Holds shared handles to the embedding provider and the store; both are
/// created once at startup. The service itself keeps no mutable state, so
/// concurrent calls never observe each other.
#[derive(Clone)]
pub struct SimilaritySearchService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn MovieStore>,
    max_top_k: usize,
}

impl SimilaritySearchService {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn MovieStore>) -> Self {
        Self {
            embedder,
            store,
            max_top_k: DEFAULT_MAX_TOP_K,
        }
    }

    pub fn with_max_top_k(mut self, max_top_k: usize) -> Self {
        self.max_top_k = max_top_k;
        self
    }

    fn validate(&self, top_k: usize, filters: Option<&SearchFilters>) -> AppResult<()> {
        if top_k == 0 {
            return Err(AppError::InvalidInput("top_k must be at least 1".to_string()));
        }
        if top_k > self.max_top_k {
            return Err(AppError::InvalidInput(format!(
                "top_k must not exceed {}",
                self.max_top_k
            )));
        }
        if let Some(filters) = filters {
            filters.validate()?;
        }
        Ok(())
    }

    /// Ranks movies against an embedding of free text
    ///
    /// An embedding failure is returned before the store is queried.
    pub async fn search_by_text(
        &self,
        text: &str,
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> AppResult<Vec<SearchResult>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Search text cannot be empty".to_string()));
        }
        self.validate(top_k, filters)?;

        let start = Instant::now();

        let embedding = self.embedder.embed(text).await.map_err(|e| {
            tracing::error!(
                error = %e,
                provider = self.embedder.name(),
                "Embedding failed, skipping vector query"
            );
            e
        })?;

        let predicate = filters.map(FilterBuilder::from_filters);
        if let Some(predicate) = &predicate {
            tracing::debug!(predicate = %predicate, "Built search predicate");
        }

        let mut results = self
            .store
            .nearest(NearestQuery {
                embedding,
                limit: top_k,
                predicate,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, store = self.store.name(), "Vector query failed");
                e
            })?;
        results.truncate(top_k);

        tracing::info!(
            top_k = top_k,
            results = results.len(),
            filtered = filters.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Text search completed"
        );

        Ok(results)
    }

    /// Ranks movies against the stored embedding of `title`
    ///
    /// Over-fetches by one because the reference movie is normally its own
    /// nearest neighbour, then drops every record carrying that title.
    pub async fn find_similar(
        &self,
        title: &str,
        top_k: usize,
        filters: Option<&SearchFilters>,
    ) -> AppResult<Vec<SearchResult>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Movie title cannot be empty".to_string()));
        }
        self.validate(top_k, filters)?;

        let start = Instant::now();

        let embedding = self
            .store
            .embedding_for_title(title)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie '{}' not found", title)))?;

        let predicate = filters.map(FilterBuilder::from_filters);
        if let Some(predicate) = &predicate {
            tracing::debug!(predicate = %predicate, "Built similarity predicate");
        }

        let neighbours = self
            .store
            .nearest(NearestQuery {
                embedding,
                limit: top_k + 1,
                predicate,
            })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, store = self.store.name(), "Similarity query failed");
                e
            })?;

        let results: Vec<SearchResult> = neighbours
            .into_iter()
            .filter(|r| r.title != title)
            .take(top_k)
            .collect();

        tracing::info!(
            title = %title,
            top_k = top_k,
            results = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Similar movies found"
        );

        Ok(results)
    }
}
