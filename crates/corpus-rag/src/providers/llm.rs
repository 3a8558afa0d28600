//! LLM provider trait for prompt completion

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SamplingParams;

/// Trait for language-model completion
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible chat completions API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt with the caller's sampling parameters, returning
    /// the model's raw text. Failures are not retried.
    async fn complete(&self, prompt: &str, sampling: &SamplingParams) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
