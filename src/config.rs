use serde::Deserialize;
use std::time::Duration;

use crate::db::DistanceFunction;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Azure OpenAI embeddings deployment URL (including `api-version`)
    pub embedding_model_endpoint: String,

    /// Cosmos DB connection string (`AccountEndpoint=...;AccountKey=...;`)
    pub cosmos_connection_string: String,

    /// Cosmos DB database holding the movie container
    pub database_name: String,

    /// Cosmos DB container holding movie documents
    pub container_name: String,

    /// Azure OpenAI API key
    pub subscription_key: String,

    /// Distance function of the container's vector policy
    /// (`cosine`, `dotproduct` or `euclidean`)
    #[serde(default)]
    pub vector_distance_function: DistanceFunction,

    /// Expected embedding length; checked on every provider response when set
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// Total timeout for a single outbound HTTP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connect timeout for outbound HTTP calls
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound accepted for `top_k`
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_max_top_k() -> usize {
    50
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Socket address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = [
            ("EMBEDDING_MODEL_ENDPOINT", "https://example.openai.azure.com/embeddings"),
            (
                "COSMOS_CONNECTION_STRING",
                "AccountEndpoint=https://example.documents.azure.com:443/;AccountKey=a2V5;",
            ),
            ("DATABASE_NAME", "movies"),
            ("CONTAINER_NAME", "catalog"),
            ("SUBSCRIPTION_KEY", "secret"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        vars
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(vars(&[])).unwrap();

        assert_eq!(config.database_name, "movies");
        assert_eq!(config.embedding_dimensions, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_top_k, 50);
        assert_eq!(config.vector_distance_function, DistanceFunction::Cosine);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("EMBEDDING_DIMENSIONS", "1536"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("PORT", "8080"),
            ("VECTOR_DISTANCE_FUNCTION", "euclidean"),
        ]))
        .unwrap();

        assert_eq!(config.embedding_dimensions, Some(1536));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.port, 8080);
        assert_eq!(config.vector_distance_function, DistanceFunction::Euclidean);
    }

    #[test]
    fn test_missing_required_value() {
        let result = envy::from_iter::<_, Config>(vec![(
            "DATABASE_NAME".to_string(),
            "movies".to_string(),
        )]);
        assert!(result.is_err());
    }
}
