/// In-process movie store
///
/// Ranks a fixed set of records by cosine distance. Useful for tests and
/// for embedding the search service without a hosted database.
use std::cmp::Ordering;

use crate::{
    db::{MovieStore, NearestQuery},
    error::AppResult,
    models::{MovieRecord, SearchResult},
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Vec<MovieRecord>,
}

impl InMemoryStore {
    pub fn new(records: Vec<MovieRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `1 - cos(a, b)`, clamped at zero; zero-magnitude vectors are maximally far
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    (1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())).max(0.0)
}

#[async_trait::async_trait]
impl MovieStore for InMemoryStore {
    async fn nearest(&self, query: NearestQuery) -> AppResult<Vec<SearchResult>> {
        let mut ranked: Vec<SearchResult> = self
            .records
            .iter()
            .filter(|r| r.embedding.len() == query.embedding.len())
            .filter(|r| query.predicate.as_ref().map_or(true, |p| p.matches(r)))
            .map(|r| r.to_result(cosine_distance(&query.embedding, &r.embedding)))
            .collect();

        ranked.sort_by(|a, b| {
            a.similarity_score
                .partial_cmp(&b.similarity_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.title.cmp(&b.title))
        });
        ranked.truncate(query.limit);

        Ok(ranked)
    }

    async fn embedding_for_title(&self, title: &str) -> AppResult<Option<Vec<f32>>> {
        Ok(self
            .records
            .iter()
            .find(|r| r.title == title)
            .map(|r| r.embedding.clone()))
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
