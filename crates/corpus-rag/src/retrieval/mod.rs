//! Similarity retrieval over a request-scoped corpus

pub mod index;
pub mod retriever;

pub use index::{InMemoryIndex, ScoredEntry, VectorIndex};
pub use retriever::Retriever;
