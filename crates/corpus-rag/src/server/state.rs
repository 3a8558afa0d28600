//! Shared application state

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::pipeline::QueryPipeline;
use crate::providers::{EmbeddingProvider, LlmProvider, OpenAiClient, OpenAiEmbedder};

/// Application state shared across handlers.
///
/// Holds only immutable configuration and provider handles; every request
/// builds its own corpus and index.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    llm: Arc<dyn LlmProvider>,
    pipeline: QueryPipeline,
}

impl AppState {
    /// Create state over explicit providers
    pub fn new(
        config: RagConfig,
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let pipeline = QueryPipeline::new(Arc::clone(&llm), embedder, config.retrieval.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                llm,
                pipeline,
            }),
        }
    }

    /// Create state backed by the OpenAI-compatible providers
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiClient::new(&config.llm)?);
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OpenAiEmbedder::new(&config.embeddings, &config.llm)?);

        tracing::info!(
            "Using {} completion model '{}' and embedding model '{}'",
            llm.name(),
            llm.model(),
            config.embeddings.model
        );

        Ok(Self::new(config, llm, embedder))
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the completion provider
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Get the request pipeline
    pub fn pipeline(&self) -> &QueryPipeline {
        &self.inner.pipeline
    }

    /// Ready when the completion provider answers its health check
    pub async fn is_ready(&self) -> bool {
        match self.inner.llm.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Readiness check failed: {}", e);
                false
            }
        }
    }
}
