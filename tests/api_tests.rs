use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cineai_api::{
    db::InMemoryStore,
    error::{AppError, AppResult},
    models::MovieRecord,
    routes::{create_router, AppState},
    services::{providers::EmbeddingProvider, SimilaritySearchService},
};

/// Embeds text by keyword presence, one axis per theme
struct KeywordEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let text = text.to_lowercase();
        let axis = |words: &[&str]| {
            if words.iter().any(|w| text.contains(w)) {
                1.0
            } else {
                0.05
            }
        };
        Ok(vec![
            axis(&["sci-fi", "mind", "space"]),
            axis(&["crime", "heist"]),
            axis(&["family", "animated"]),
        ])
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

struct FailingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
        Err(AppError::Embedding("provider unavailable".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn movie(title: &str, genres: &[&str], rating: f64, year: i32, embedding: [f32; 3]) -> MovieRecord {
    MovieRecord {
        id: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        rating,
        year,
        plot_summary: format!("{} summary", title),
        plot_synopsis: format!("{} synopsis", title),
        embedding: embedding.to_vec(),
    }
}

fn catalog() -> InMemoryStore {
    InMemoryStore::new(vec![
        movie("Inception", &["Sci-Fi", "Thriller"], 8.8, 2010, [1.0, 0.2, 0.0]),
        movie("Interstellar", &["Sci-Fi", "Drama"], 8.7, 2014, [0.95, 0.0, 0.1]),
        movie("Primer", &["Sci-Fi"], 6.9, 2004, [0.9, 0.1, 0.0]),
        movie("The Matrix", &["Sci-Fi", "Action"], 8.7, 1999, [0.85, 0.3, 0.0]),
        movie("Heat", &["Crime", "Thriller"], 8.3, 1995, [0.1, 1.0, 0.0]),
        movie("Ocean's Eleven", &["Crime", "Comedy"], 7.7, 2001, [0.0, 0.9, 0.2]),
        movie("Toy Story", &["Animation", "Family"], 8.3, 1995, [0.1, 0.0, 1.0]),
    ])
}

fn create_test_server_with(embedder: impl EmbeddingProvider + 'static) -> TestServer {
    let search = SimilaritySearchService::new(Arc::new(embedder), Arc::new(catalog()))
        .with_max_top_k(6);
    let app = create_router(Arc::new(AppState::new(search)));
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(KeywordEmbedder)
}

fn titles(body: &Value) -> Vec<String> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

fn scores(body: &Value) -> Vec<f64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["similarity_score"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_text_search_returns_ranked_top_k() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({
            "query": "mind-bending sci-fi thriller",
            "top_k": 3
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 3);

    let scores = scores(&body);
    assert_eq!(scores.len(), 3);
    assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    assert!(scores.iter().all(|s| *s >= 0.0));

    let first = &body["results"][0];
    assert!(first["genres"].as_array().unwrap().contains(&json!("Sci-Fi")));
    assert!(first.get("embedding").is_none());
}

#[tokio::test]
async fn test_text_search_rating_filter() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({
            "query": "mind-bending sci-fi",
            "top_k": 6,
            "filters": { "rating_range": [7.0, 10.0] }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    for result in body["results"].as_array().unwrap() {
        let rating = result["rating"].as_f64().unwrap();
        assert!((7.0..=10.0).contains(&rating), "rating {} out of range", rating);
    }
    assert!(!titles(&body).contains(&"Primer".to_string()));
}

#[tokio::test]
async fn test_text_search_genre_and_year_filter() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({
            "query": "a crime heist",
            "top_k": 5,
            "filters": {
                "year_range": [1990, 2000],
                "genres": ["Crime", "Family"]
            }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Heat", "Toy Story"]);
}

#[tokio::test]
async fn test_text_search_embedding_failure() {
    let server = create_test_server_with(FailingEmbedder);

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({ "query": "anything" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("Embedding"));
}

#[tokio::test]
async fn test_text_search_rejects_bad_input() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({ "query": "  " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({ "query": "sci-fi", "top_k": 7 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/v1/movies/search")
        .json(&json!({ "query": "sci-fi", "filters": { "rating_range": [9.0, 2.0] } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_similar_excludes_reference_title() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/similar")
        .json(&json!({ "title": "Inception", "top_k": 3 }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let found = titles(&body);
    assert_eq!(found.len(), 3);
    assert!(!found.contains(&"Inception".to_string()));
    assert!(scores(&body).windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_similar_with_filters() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/similar")
        .json(&json!({
            "title": "Heat",
            "top_k": 5,
            "filters": { "genres": ["Crime"] }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(titles(&body), vec!["Ocean's Eleven"]);
}

#[tokio::test]
async fn test_similar_unknown_title_is_404() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/similar")
        .json(&json!({ "title": "Wet Hot American Summer", "top_k": 3 }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Wet Hot American Summer"));
}

#[tokio::test]
async fn test_autocomplete() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/movies/autocomplete")
        .add_query_param("q", "incep")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["suggestions"], json!(["Inception"]));

    let response = server
        .get("/api/v1/movies/autocomplete")
        .add_query_param("q", "the")
        .add_query_param("limit", 2)
        .await;
    let body: Value = response.json();
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = create_test_server();
    let id = "6f9619ff-8b86-4d11-b42d-00c04fc964ff";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let response = server.get("/health").await;
    let generated = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(generated.to_str().unwrap()).is_ok());
}
