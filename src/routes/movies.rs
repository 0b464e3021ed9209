use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tower_http::request_id::RequestId;

use crate::{
    error::AppResult,
    middleware::request_id::request_id_str,
    models::{SearchResponse, SimilarRequest, TextSearchRequest},
    routes::AppState,
};

/// Handler for free-text ("mood") search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<TextSearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    tracing::info!(
        request_id = request_id_str(&request_id),
        top_k = request.top_k,
        "Processing text search request"
    );

    let results = state
        .search
        .search_by_text(&request.query, request.top_k, request.filters.as_ref())
        .await?;

    Ok(Json(results.into()))
}

/// Handler for "more like this title"
pub async fn similar(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SimilarRequest>,
) -> AppResult<Json<SearchResponse>> {
    tracing::info!(
        request_id = request_id_str(&request_id),
        title = %request.title,
        top_k = request.top_k,
        "Processing similar movies request"
    );

    let results = state
        .search
        .find_similar(&request.title, request.top_k, request.filters.as_ref())
        .await?;

    Ok(Json(results.into()))
}
