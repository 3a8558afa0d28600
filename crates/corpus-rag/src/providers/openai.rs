//! OpenAI-compatible clients for completions and embeddings

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::SamplingParams;

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Chat completions client. The model is fixed at construction.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    /// Create a client from the service's LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, prompt: &'a str, sampling: &SamplingParams) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::upstream("No text in completion response"))
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn complete(&self, prompt: &str, sampling: &SamplingParams) -> Result<String> {
        let request = self.build_request(prompt, sampling);

        let response = authorize(self.client.post(self.endpoint()), self.api_key.as_deref())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(rejected("Completion", status, &body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse completion response: {}", e)))?;

        parsed.into_text()
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.base_url);
        match authorize(self.client.get(&url), self.api_key.as_deref())
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Embeddings client for query text
pub struct OpenAiEmbedder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedder {
    /// Create an embedder; unset base URL and key fall back to the LLM settings
    pub fn new(config: &EmbeddingConfig, llm: &LlmConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(&llm.base_url);
        Ok(Self {
            client: build_http_client(llm.timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().or_else(|| llm.api_key.clone()),
            model: config.model.clone(),
        })
    }

    /// Embedding model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl EmbedResponse {
    fn into_embedding(self) -> Result<Vec<f32>> {
        self.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::upstream("No embedding in response"))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };

        let response = authorize(self.client.post(&url), self.api_key.as_deref())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(rejected("Embedding", status, &body));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse embedding response: {}", e)))?;

        parsed.into_embedding()
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))
}

/// Log the provider's error body and hand back only the status
fn rejected(call: &str, status: reqwest::StatusCode, body: &str) -> Error {
    tracing::warn!("{} request rejected by provider ({}): {}", call, status, body);
    Error::upstream(format!("{} failed with status {}", call, status))
}

fn authorize(builder: reqwest::RequestBuilder, api_key: Option<&str>) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) => builder.bearer_auth(key),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_carries_sampling() {
        let client = OpenAiClient::new(&LlmConfig::default()).unwrap();
        let sampling = SamplingParams::new(0.25, 0.5).unwrap();
        let body = serde_json::to_value(client.build_request("hello", &sampling)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4",
                "messages": [{ "role": "user", "content": "hello" }],
                "temperature": 0.25,
                "top_p": 0.5
            })
        );
    }

    #[test]
    fn test_max_tokens_serialized_when_set() {
        let config = LlmConfig {
            max_tokens: Some(256),
            ..Default::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        let sampling = SamplingParams::new(0.0, 1.0).unwrap();
        let body = serde_json::to_value(client.build_request("hi", &sampling)).unwrap();
        assert_eq!(body["max_tokens"], 256);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:8000/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_chat_response_text() {
        let parsed: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Tea." } }]
        }))
        .unwrap();
        assert_eq!(parsed.into_text().unwrap(), "Tea.");
    }

    #[test]
    fn test_empty_choices_is_upstream_error() {
        let parsed: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(matches!(parsed.into_text(), Err(Error::Upstream(_))));

        let parsed: ChatResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        }))
        .unwrap();
        assert!(matches!(parsed.into_text(), Err(Error::Upstream(_))));
    }

    #[test]
    fn test_embed_response() {
        let parsed: EmbedResponse = serde_json::from_value(json!({
            "data": [{ "index": 0, "embedding": [0.5, -0.5] }]
        }))
        .unwrap();
        assert_eq!(parsed.into_embedding().unwrap(), vec![0.5, -0.5]);

        let parsed: EmbedResponse = serde_json::from_value(json!({ "data": [] })).unwrap();
        assert!(parsed.into_embedding().is_err());
    }

    #[test]
    fn test_rejected_hides_provider_body() {
        let err = rejected(
            "Completion",
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"quota exceeded for org-secret"}}"#,
        );
        let Error::Upstream(message) = err else {
            panic!("expected upstream error");
        };
        assert_eq!(message, "Completion failed with status 429 Too Many Requests");
        assert!(!message.contains("org-secret"));
    }

    #[test]
    fn test_embedder_falls_back_to_llm_settings() {
        let llm = LlmConfig {
            base_url: "http://llm.local/v1".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let embedder = OpenAiEmbedder::new(&EmbeddingConfig::default(), &llm).unwrap();
        assert_eq!(embedder.base_url, "http://llm.local/v1");
        assert_eq!(embedder.api_key.as_deref(), Some("sk-test"));
        assert_eq!(embedder.model(), "text-embedding-ada-002");
    }
}
