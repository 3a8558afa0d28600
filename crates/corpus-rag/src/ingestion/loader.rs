//! Converts caller-supplied (text, embedding) pairs into corpus entries

use crate::error::{Error, Result};
use crate::types::{CorpusEntry, NodeWithEmbedding};

/// Builds addressable corpus entries from the request's nodes
pub struct CorpusLoader;

impl CorpusLoader {
    /// Load nodes into entries, assigning each the position it had in the
    /// input. Every embedding must be non-empty, finite, and share one
    /// dimensionality.
    pub fn load(nodes: Vec<NodeWithEmbedding>) -> Result<Vec<CorpusEntry>> {
        if nodes.is_empty() {
            return Err(Error::validation("nodesWithEmbedding must not be empty"));
        }

        let dimensions = nodes[0].embedding.len();
        let mut entries = Vec::with_capacity(nodes.len());

        for (id, node) in nodes.into_iter().enumerate() {
            Self::check_embedding(id, &node.embedding, dimensions)?;
            entries.push(CorpusEntry::new(id, node.text, node.embedding));
        }

        tracing::debug!(
            "Loaded {} corpus entries ({} dimensions)",
            entries.len(),
            dimensions
        );

        Ok(entries)
    }

    fn check_embedding(id: usize, embedding: &[f32], dimensions: usize) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::validation(format!(
                "nodesWithEmbedding[{}].embedding must not be empty",
                id
            )));
        }
        if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
            return Err(Error::validation(format!(
                "nodesWithEmbedding[{}].embedding[{}] is not a finite number",
                id, pos
            )));
        }
        if embedding.len() != dimensions {
            return Err(Error::validation(format!(
                "nodesWithEmbedding[{}].embedding has {} dimensions, expected {}",
                id,
                embedding.len(),
                dimensions
            )));
        }
        Ok(())
    }
}
