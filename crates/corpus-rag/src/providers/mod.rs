//! Provider abstractions for completions and query embeddings
//!
//! The pipeline only talks to these traits, so the model backend can be
//! swapped (or faked in tests) without touching retrieval code.

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use openai::{OpenAiClient, OpenAiEmbedder};
