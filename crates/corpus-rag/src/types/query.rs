//! Query request types

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};

/// A caller-supplied fragment and its embedding, as it arrives on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWithEmbedding {
    /// Fragment text
    pub text: String,
    /// Pre-computed embedding
    pub embedding: Vec<f32>,
}

impl NodeWithEmbedding {
    /// Create a new node
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }
}

/// Body of `POST /api/retrieveandquery`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveAndQueryRequest {
    /// The user's question (ignored in structured mode)
    pub query: String,

    /// Number of fragments to retrieve (default from config, normally 2).
    /// Signed so that non-positive values surface as validation errors.
    #[serde(default)]
    pub top_k: Option<i64>,

    /// The corpus
    pub nodes_with_embedding: Vec<NodeWithEmbedding>,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling parameter
    pub top_p: f32,

    /// Extract character records instead of answering the query
    #[serde(default)]
    pub structured_output: Option<bool>,

    /// Pre-computed embedding of the query text, in the corpus embedding space
    #[serde(default)]
    pub query_embedding: Option<Vec<f32>>,
}

impl RetrieveAndQueryRequest {
    /// Create a free-form request with default sampling
    pub fn new(query: impl Into<String>, nodes: Vec<NodeWithEmbedding>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
            nodes_with_embedding: nodes,
            temperature: 0.1,
            top_p: 1.0,
            structured_output: None,
            query_embedding: None,
        }
    }

    /// Set the number of fragments to retrieve
    pub fn with_top_k(mut self, k: i64) -> Self {
        self.top_k = Some(k);
        self
    }

    /// Switch to structured character extraction
    pub fn structured(mut self) -> Self {
        self.structured_output = Some(true);
        self
    }

    /// Attach a pre-computed query embedding
    pub fn with_query_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.query_embedding = Some(embedding);
        self
    }

    /// Validate the scalar fields and split the request into the query and
    /// its corpus. Corpus contents are checked by the loader.
    pub fn into_parts(self, config: &RetrievalConfig) -> Result<(Query, Vec<NodeWithEmbedding>)> {
        let top_k = resolve_top_k(self.top_k, config)?;
        let sampling = SamplingParams::new(self.temperature, self.top_p)?;

        let mode = if self.structured_output.unwrap_or(false) {
            OutputMode::Structured
        } else {
            OutputMode::FreeForm
        };

        if mode == OutputMode::FreeForm && self.query.trim().is_empty() {
            return Err(Error::validation("query must not be empty"));
        }

        if let Some(embedding) = &self.query_embedding {
            if embedding.is_empty() {
                return Err(Error::validation("queryEmbedding must not be empty"));
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(Error::validation("queryEmbedding contains non-finite values"));
            }
        }

        let query = Query {
            text: self.query,
            top_k,
            sampling,
            mode,
            embedding: self.query_embedding,
        };

        Ok((query, self.nodes_with_embedding))
    }
}

fn resolve_top_k(requested: Option<i64>, config: &RetrievalConfig) -> Result<usize> {
    match requested {
        None => Ok(config.default_top_k),
        Some(k) if k <= 0 => Err(Error::validation(format!(
            "topK must be a positive integer, got {}",
            k
        ))),
        Some(k) if k as u64 > config.max_top_k as u64 => Err(Error::validation(format!(
            "topK {} exceeds the maximum of {}",
            k, config.max_top_k
        ))),
        Some(k) => Ok(k as usize),
    }
}

/// How the model's answer is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Answer the caller's query in prose
    FreeForm,
    /// Enumerate characters as a JSON array of records
    Structured,
}

/// Caller-chosen sampling parameters for one completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Temperature (0.0-2.0)
    pub temperature: f32,
    /// Top-p (0.0-1.0)
    pub top_p: f32,
}

impl SamplingParams {
    /// Create validated sampling parameters
    pub fn new(temperature: f32, top_p: f32) -> Result<Self> {
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(Error::validation(format!(
                "temperature must be within [0, 2], got {}",
                temperature
            )));
        }
        if !top_p.is_finite() || !(0.0..=1.0).contains(&top_p) {
            return Err(Error::validation(format!(
                "topP must be within [0, 1], got {}",
                top_p
            )));
        }
        Ok(Self { temperature, top_p })
    }
}

/// A validated query, immutable for the duration of one request
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The caller's literal query text
    pub text: String,
    /// Number of fragments to retrieve
    pub top_k: usize,
    /// Sampling parameters for the completion
    pub sampling: SamplingParams,
    /// Free-form answer or structured extraction
    pub mode: OutputMode,
    /// Caller-supplied query embedding, if any
    pub embedding: Option<Vec<f32>>,
}
