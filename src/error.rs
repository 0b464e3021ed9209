use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// `Embedding`, `NotFound` and `BackendQuery` are kept apart so callers can
/// tell "nothing matched" from "the lookup failed".
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend query error: {0}")]
    BackendQuery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            // Upstream detail goes to the log, not to the client
            AppError::Embedding(_) => (
                StatusCode::BAD_GATEWAY,
                "Embedding provider unavailable".to_string(),
            ),
            AppError::BackendQuery(_) => (
                StatusCode::BAD_GATEWAY,
                "Movie store query failed".to_string(),
            ),
            AppError::Config(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
