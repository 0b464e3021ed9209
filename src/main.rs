use std::sync::Arc;

use cineai_api::{
    config::Config,
    db::CosmosStore,
    routes::{create_router, AppState},
    services::{providers::AzureOpenAiEmbeddings, SimilaritySearchService},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cineai_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // One client for both upstreams; every call inherits these timeouts
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .build()?;

    let embedder = AzureOpenAiEmbeddings::new(
        http_client.clone(),
        config.embedding_model_endpoint.clone(),
        config.subscription_key.clone(),
        config.embedding_dimensions,
    );
    let store = CosmosStore::new(
        http_client,
        &config.cosmos_connection_string,
        &config.database_name,
        &config.container_name,
        config.vector_distance_function,
    )?;

    let search = SimilaritySearchService::new(Arc::new(embedder), Arc::new(store))
        .with_max_top_k(config.max_top_k);
    let app = create_router(Arc::new(AppState::new(search)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
