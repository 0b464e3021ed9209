/// Embedding provider abstraction
///
/// The similarity service never talks to a model directly; it asks an
/// `EmbeddingProvider` for a vector and hands that to the store. Swapping
/// Azure OpenAI for another hosted model only needs a new implementation.
use crate::error::AppResult;

pub mod azure_openai;

pub use azure_openai::AzureOpenAiEmbeddings;

/// Trait for text embedding providers
///
/// Implementations must not retry on their own; a failed call is reported
/// once as `AppError::Embedding`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single piece of free text
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
