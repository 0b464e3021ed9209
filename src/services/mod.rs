pub mod autocomplete;
pub mod filter;
pub mod providers;
pub mod similarity_search;

pub use filter::{FilterBuilder, Predicate};
pub use similarity_search::SimilaritySearchService;
