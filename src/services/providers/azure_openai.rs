/// Azure OpenAI embeddings provider
///
/// Calls a deployment endpoint of the form
/// `https://{resource}.openai.azure.com/openai/deployments/{deployment}/embeddings?api-version=...`
/// with the `api-key` header. The endpoint is used verbatim.
use crate::{
    error::{AppError, AppResult},
    services::providers::EmbeddingProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Clone)]
pub struct AzureOpenAiEmbeddings {
    http_client: HttpClient,
    endpoint: String,
    api_key: String,
    /// Rejects responses of the wrong length when set
    dimensions: Option<usize>,
}

impl AzureOpenAiEmbeddings {
    /// `http_client` should already carry the request timeouts
    pub fn new(
        http_client: HttpClient,
        endpoint: String,
        api_key: String,
        dimensions: Option<usize>,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            api_key,
            dimensions,
        }
    }

    fn transport_error(e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Embedding("Embedding request timed out".to_string())
        } else {
            AppError::Embedding(format!("Embedding request failed: {}", e))
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for AzureOpenAiEmbeddings {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&EmbeddingRequest { input: text })
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                provider = self.name(),
                "Embedding request rejected"
            );
            let reason = match status {
                StatusCode::TOO_MANY_REQUESTS => "rate limited".to_string(),
                StatusCode::BAD_REQUEST => format!("input rejected: {}", body),
                _ => format!("status {}: {}", status, body),
            };
            return Err(AppError::Embedding(format!("Embedding provider {}", reason)));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| {
                AppError::Embedding("Embedding response contained no vector".to_string())
            })?;

        if let Some(expected) = self.dimensions {
            if embedding.len() != expected {
                return Err(AppError::Embedding(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    expected,
                    embedding.len()
                )));
            }
        }

        tracing::debug!(
            dimensions = embedding.len(),
            provider = self.name(),
            "Embedding generated"
        );

        Ok(embedding)
    }

    fn name(&self) -> &'static str {
        "azure_openai"
    }
}
