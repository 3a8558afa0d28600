//! Type definitions for the retrieve-and-query pipeline

pub mod corpus;
pub mod query;
pub mod response;

pub use corpus::CorpusEntry;
pub use query::{NodeWithEmbedding, OutputMode, Query, RetrieveAndQueryRequest, SamplingParams};
pub use response::{CharacterRecord, QueryResponse, ResponsePayload};
