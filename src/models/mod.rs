use serde::{Deserialize, Serialize};

pub mod filters;
pub mod movie;

pub use filters::{RatingRange, SearchFilters, YearRange};
pub use movie::{MovieRecord, SearchResult};

/// Number of results returned when a request omits `top_k`
pub const DEFAULT_TOP_K: usize = 5;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// Free-text ("mood") search request
#[derive(Debug, Clone, Deserialize)]
pub struct TextSearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

/// Title-to-title similarity request
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarRequest {
    pub title: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

/// Ranked results, nearest first
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub count: usize,
}

impl From<Vec<SearchResult>> for SearchResponse {
    fn from(results: Vec<SearchResult>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub q: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<&'static str>,
}
