//! Corpus entry type

use serde::{Deserialize, Serialize};

/// A text fragment with its caller-supplied embedding.
///
/// Lives only inside the index built for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Position of the fragment in the request's input sequence
    pub id: usize,
    /// Fragment text
    pub text: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

impl CorpusEntry {
    /// Create a new entry
    pub fn new(id: usize, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id,
            text: text.into(),
            embedding,
        }
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}
