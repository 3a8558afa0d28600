//! corpus-rag: Retrieval-augmented answers over caller-supplied corpora
//!
//! Each request carries its own pre-embedded text fragments. The service
//! builds a transient similarity index over them, retrieves the top-K
//! fragments for the query, grounds a completion prompt in them, and
//! optionally validates the model's answer as structured character records.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::QueryPipeline;
pub use types::{
    corpus::CorpusEntry,
    query::{NodeWithEmbedding, Query, RetrieveAndQueryRequest},
    response::{CharacterRecord, QueryResponse, ResponsePayload},
};
