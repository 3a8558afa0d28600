//! Retrieve-and-query server binary
//!
//! Run with: cargo run -p corpus-rag --bin corpus-rag-server

use corpus_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "corpus_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - LLM endpoint: {}", config.llm.base_url);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Default top_k: {}", config.retrieval.default_top_k);
    tracing::info!("  - Similarity: {:?}", config.retrieval.metric);

    if config.llm.api_key.is_none() {
        tracing::warn!(
            "No API key configured; set {} if the model endpoint requires one",
            corpus_rag::config::API_KEY_ENV
        );
    }

    let server = RagServer::new(config)?;

    tracing::info!("  API: http://{}/api/retrieveandquery", server.address());
    tracing::info!("  Health: http://{}/health", server.address());

    server.start().await?;

    Ok(())
}
