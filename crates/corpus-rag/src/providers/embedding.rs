//! Embedding provider trait for query embeddings

use async_trait::async_trait;

use crate::error::Result;

/// Trait for embedding query text into the corpus embedding space
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI-compatible embeddings API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
