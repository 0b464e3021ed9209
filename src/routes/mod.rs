use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{
        make_span_with_request_id, propagate_request_id_layer, set_request_id_layer,
    },
    services::SimilaritySearchService,
};

pub mod autocomplete;
pub mod movies;

/// Shared handles, built once at startup
pub struct AppState {
    pub search: SimilaritySearchService,
}

impl AppState {
    pub fn new(search: SimilaritySearchService) -> Self {
        Self { search }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(propagate_request_id_layer())
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies/search", post(movies::search))
        .route("/movies/similar", post(movies::similar))
        .route("/movies/autocomplete", get(autocomplete::suggest))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
