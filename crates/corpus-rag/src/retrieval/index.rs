//! Ephemeral vector index
//!
//! The index is built fresh for each request from the loaded corpus and
//! dropped when the request completes. Lookup is exhaustive: every entry is
//! scored against the query and the results are ranked with a stable sort,
//! so entries with equal scores keep their insertion order.
//!
//! Scores accumulate in `f64`: squaring a large but finite `f32` component
//! overflows `f32`, while the square of `f32::MAX` still fits in `f64`.

use crate::config::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::CorpusEntry;

/// An entry paired with its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredEntry<'a> {
    /// The matched entry
    pub entry: &'a CorpusEntry,
    /// Similarity score (higher is more similar)
    pub score: f32,
}

/// Similarity-ranked storage for corpus entries
///
/// Implementations:
/// - `InMemoryIndex`: exhaustive scan over entries held in memory
pub trait VectorIndex: Send + Sync {
    /// Add an entry. Entries are ranked ahead of later ones on equal scores.
    fn admit(&mut self, entry: CorpusEntry) -> Result<()>;

    /// Return up to `k` entries most similar to `query`, best first.
    ///
    /// An empty index yields an empty result. A `k` larger than the index
    /// returns every entry.
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry<'_>>>;

    /// Number of admitted entries
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get index name for logging
    fn name(&self) -> &str;
}

/// Brute-force in-memory index
pub struct InMemoryIndex {
    metric: DistanceMetric,
    entries: Vec<CorpusEntry>,
    /// L2 norm of each entry, kept alongside `entries`
    norms: Vec<f64>,
}

impl InMemoryIndex {
    /// Create an empty index
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            metric,
            entries: Vec::new(),
            norms: Vec::new(),
        }
    }

    /// Build an index from entries, admitting them in order
    pub fn from_entries(
        metric: DistanceMetric,
        entries: impl IntoIterator<Item = CorpusEntry>,
    ) -> Result<Self> {
        let mut index = Self::new(metric);
        for entry in entries {
            index.admit(entry)?;
        }
        Ok(index)
    }

    /// Dimensionality of the stored embeddings, if any are stored
    pub fn dimensions(&self) -> Option<usize> {
        self.entries.first().map(CorpusEntry::dimensions)
    }

    fn score(&self, query: &[f32], query_norm: f64, slot: usize) -> f32 {
        let embedding = &self.entries[slot].embedding;
        let raw = match self.metric {
            DistanceMetric::DotProduct => dot_product(query, embedding),
            DistanceMetric::Cosine => {
                let norm = self.norms[slot];
                if query_norm == 0.0 || norm == 0.0 {
                    0.0
                } else {
                    dot_product(query, embedding) / (query_norm * norm)
                }
            }
        };
        narrow_score(raw)
    }
}

impl VectorIndex for InMemoryIndex {
    fn admit(&mut self, entry: CorpusEntry) -> Result<()> {
        if let Some(dimensions) = self.dimensions() {
            if entry.dimensions() != dimensions {
                return Err(Error::validation(format!(
                    "entry {} has {} dimensions, index holds {}",
                    entry.id,
                    entry.dimensions(),
                    dimensions
                )));
            }
        }

        self.norms.push(l2_norm(&entry.embedding));
        self.entries.push(entry);
        Ok(())
    }

    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredEntry<'_>>> {
        let Some(dimensions) = self.dimensions() else {
            return Ok(Vec::new());
        };

        if query.len() != dimensions {
            return Err(Error::validation(format!(
                "query embedding has {} dimensions, corpus has {}",
                query.len(),
                dimensions
            )));
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<ScoredEntry<'_>> = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| ScoredEntry {
                entry,
                score: self.score(query, query_norm, slot),
            })
            .collect();

        // Stable: equal scores keep insertion order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        Ok(scored)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum()
}

fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt()
}

/// Saturate into the finite `f32` range so ranking never sees inf or NaN
fn narrow_score(raw: f64) -> f32 {
    if raw.is_nan() {
        f32::MIN
    } else if raw == 0.0 {
        // total_cmp orders -0.0 below 0.0
        0.0
    } else {
        raw.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
    }
}
