//! Configuration for the retrieve-and-query service

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable naming the TOML configuration file
pub const CONFIG_PATH_ENV: &str = "CORPUS_RAG_CONFIG";
/// Environment variable carrying the model provider API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the bind host
pub const HOST_ENV: &str = "CORPUS_RAG_HOST";
/// Environment variable overriding the bind port
pub const PORT_ENV: &str = "CORPUS_RAG_PORT";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Completion model configuration
    pub llm: LlmConfig,
    /// Query embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Retrieval defaults and limits
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load configuration from `CORPUS_RAG_CONFIG` (if set) and apply
    /// environment overrides
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`RagConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = match var(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(key) = var(API_KEY_ENV) {
            config.llm.api_key = Some(key);
        }
        if let Some(host) = var(HOST_ENV) {
            config.server.host = host;
        }
        if let Some(port) = var(PORT_ENV) {
            config.server.port = port
                .parse()
                .map_err(|e| Error::config(format!("Invalid {} '{}': {}", PORT_ENV, port, e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config("server.port must be non-zero"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(Error::config("llm.model must not be empty"));
        }
        if self.embeddings.model.trim().is_empty() {
            return Err(Error::config("embeddings.model must not be empty"));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(Error::config("retrieval.default_top_k must be positive"));
        }
        if self.retrieval.max_top_k < self.retrieval.default_top_k {
            return Err(Error::config(format!(
                "retrieval.max_top_k ({}) is below retrieval.default_top_k ({})",
                self.retrieval.max_top_k, self.retrieval.default_top_k
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes (default: 32MB)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_body_size: 32 * 1024 * 1024, // 32MB, corpora arrive inline
        }
    }
}

/// Completion client configuration. The model is fixed by the service;
/// sampling parameters come with each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// API key (usually supplied through `OPENAI_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Generation model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Optional cap on generated tokens
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4".to_string(),
            timeout_secs: 120,
            max_tokens: None,
        }
    }
}

/// Query embedding configuration. Must name the model the caller used for
/// the corpus embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Base URL override (falls back to `llm.base_url`)
    pub base_url: Option<String>,
    /// API key override (falls back to `llm.api_key`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Similarity function used to rank corpus entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity
    #[default]
    Cosine,
    /// Raw dot product (equivalent to cosine for pre-normalized embeddings)
    DotProduct,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of fragments retrieved when the request omits `topK`
    pub default_top_k: usize,
    /// Largest `topK` a request may ask for
    pub max_top_k: usize,
    /// Similarity function
    pub metric: DistanceMetric,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: 2,
            max_top_k: 100,
            metric: DistanceMetric::Cosine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.retrieval.default_top_k, 2);
        assert_eq!(config.retrieval.metric, DistanceMetric::Cosine);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RagConfig::from_toml_str(
            r#"
            [server]
            port = 9000

            [retrieval]
            metric = "dot_product"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.retrieval.metric, DistanceMetric::DotProduct);
        assert_eq!(config.retrieval.default_top_k, 2);
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RagConfig::from_toml_str("server = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_inconsistent_top_k() {
        let mut config = RagConfig::default();
        config.retrieval.default_top_k = 0;
        assert!(config.validate().is_err());

        config.retrieval.default_top_k = 10;
        config.retrieval.max_top_k = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_no_variables_gives_defaults() {
        let config = RagConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = RagConfig::from_lookup(lookup(&[
            (API_KEY_ENV, " sk-env "),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9100"),
        ]))
        .unwrap();

        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = RagConfig::from_lookup(lookup(&[(API_KEY_ENV, "   ")])).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        let err = RagConfig::from_lookup(lookup(&[(PORT_ENV, "eighty")])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains(PORT_ENV)));

        let err = RagConfig::from_lookup(lookup(&[(PORT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_file_then_overrides() {
        let path = std::env::temp_dir().join(format!("corpus-rag-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
            [server]
            host = "10.0.0.1"
            port = 7000

            [llm]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        let owned = path.to_string_lossy().to_string();
        let path_str = owned.as_str();

        let from_file = RagConfig::from_lookup(lookup(&[(CONFIG_PATH_ENV, path_str)])).unwrap();
        assert_eq!(from_file.server.host, "10.0.0.1");
        assert_eq!(from_file.server.port, 7000);
        assert_eq!(from_file.llm.model, "gpt-4o-mini");

        let overridden = RagConfig::from_lookup(lookup(&[
            (CONFIG_PATH_ENV, path_str),
            (PORT_ENV, "7001"),
        ]))
        .unwrap();
        assert_eq!(overridden.server.host, "10.0.0.1");
        assert_eq!(overridden.server.port, 7001);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let path = std::env::temp_dir()
            .join(format!("corpus-rag-missing-{}.toml", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string();
        let err = RagConfig::from_lookup(lookup(&[(CONFIG_PATH_ENV, path.as_str())])).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
