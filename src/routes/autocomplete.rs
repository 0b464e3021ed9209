use axum::{extract::Query, Json};

use crate::{
    models::{AutocompleteQuery, AutocompleteResponse},
    services::autocomplete::{self, DEFAULT_SUGGESTION_LIMIT},
};

const MAX_SUGGESTION_LIMIT: usize = 25;

/// Handler for title suggestions
pub async fn suggest(Query(params): Query<AutocompleteQuery>) -> Json<AutocompleteResponse> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_SUGGESTION_LIMIT)
        .min(MAX_SUGGESTION_LIMIT);

    Json(AutocompleteResponse {
        suggestions: autocomplete::suggest(&params.q, limit),
    })
}
