//! Top-K retrieval against a vector index

use crate::error::{Error, Result};

use super::index::{ScoredEntry, VectorIndex};

/// Selects the `top_k` entries of an index most similar to a query embedding
pub struct Retriever<'a> {
    index: &'a dyn VectorIndex,
    top_k: usize,
}

impl<'a> Retriever<'a> {
    /// Create a retriever. A zero `top_k` is a configuration error.
    pub fn new(index: &'a dyn VectorIndex, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::config("top_k must be a positive integer"));
        }
        Ok(Self { index, top_k })
    }

    /// Retrieve ranked entries for a query embedding
    pub fn retrieve(&self, query_embedding: &[f32]) -> Result<Vec<ScoredEntry<'a>>> {
        let hits = self.index.nearest(query_embedding, self.top_k)?;

        tracing::info!(
            "Retrieved {}/{} entries from {} index (top_k={}, best score {:.4})",
            hits.len(),
            self.index.len(),
            self.index.name(),
            self.top_k,
            hits.first().map(|h| h.score).unwrap_or(0.0)
        );

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceMetric;
    use crate::retrieval::InMemoryIndex;
    use crate::types::CorpusEntry;

    fn sample_index() -> InMemoryIndex {
        InMemoryIndex::from_entries(
            DistanceMetric::Cosine,
            vec![
                CorpusEntry::new(0, "Alice loves tea.", vec![1.0, 0.0]),
                CorpusEntry::new(1, "Bob rides a bike.", vec![0.0, 1.0]),
                CorpusEntry::new(2, "Alice and Bob meet.", vec![0.6, 0.8]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_retrieve_top_k() {
        let index = sample_index();
        let retriever = Retriever::new(&index, 2).unwrap();
        let hits = retriever.retrieve(&[1.0, 0.0]).unwrap();

        let texts: Vec<&str> = hits.iter().map(|h| h.entry.text.as_str()).collect();
        assert_eq!(texts, vec!["Alice loves tea.", "Alice and Bob meet."]);
    }

    #[test]
    fn test_zero_top_k_is_config_error() {
        let index = sample_index();
        assert!(matches!(Retriever::new(&index, 0), Err(Error::Config(_))));
    }

    #[test]
    fn test_retrieve_twice_is_identical() {
        let index = sample_index();
        let retriever = Retriever::new(&index, 3).unwrap();
        let a = retriever.retrieve(&[0.3, 0.7]).unwrap();
        let b = retriever.retrieve(&[0.3, 0.7]).unwrap();
        assert_eq!(a, b);
    }
}
