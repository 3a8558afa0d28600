//! Request-scoped retrieve-and-query pipeline
//!
//! Loader -> Index -> Retriever -> Prompt -> Completion -> (Validator).
//! Nothing built here outlives a call to [`QueryPipeline::run`], so
//! concurrent requests share no mutable state.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::generation::{CharacterSchema, PromptBuilder};
use crate::ingestion::CorpusLoader;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::{InMemoryIndex, Retriever};
use crate::types::{OutputMode, Query, ResponsePayload, RetrieveAndQueryRequest};

/// Runs one retrieve-and-query request end to end
pub struct QueryPipeline {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    retrieval: RetrievalConfig,
}

impl QueryPipeline {
    /// Create a pipeline over the given providers
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            llm,
            embedder,
            retrieval,
        }
    }

    /// Answer a request. Every failure is terminal for the request.
    pub async fn run(&self, request: RetrieveAndQueryRequest) -> Result<ResponsePayload> {
        let start = Instant::now();

        let (query, nodes) = request.into_parts(&self.retrieval)?;
        let entries = CorpusLoader::load(nodes)?;

        tracing::info!(
            "Request accepted: {} fragments, top_k={}, mode={:?}",
            entries.len(),
            query.top_k,
            query.mode
        );

        let index = InMemoryIndex::from_entries(self.retrieval.metric, entries)?;
        let query_embedding = self.resolve_query_embedding(&query).await?;

        let prompt = {
            let retriever = Retriever::new(&index, query.top_k)?;
            let hits = retriever.retrieve(&query_embedding)?;
            PromptBuilder::compose(&query, &hits)
        };
        drop(index);

        let completion_start = Instant::now();
        let completion = self.llm.complete(&prompt, &query.sampling).await?;
        tracing::info!(
            "Completion received in {}ms ({} chars)",
            completion_start.elapsed().as_millis(),
            completion.len()
        );

        let payload = match query.mode {
            OutputMode::FreeForm => ResponsePayload::free_form(completion),
            OutputMode::Structured => {
                let characters = CharacterSchema::parse(&completion)?;
                tracing::info!("Extracted {} characters", characters.len());
                ResponsePayload::characters(characters)
            }
        };

        tracing::info!("Request completed in {}ms", start.elapsed().as_millis());

        Ok(payload)
    }

    /// Use the caller's query embedding when present, otherwise embed the
    /// text the model is actually asked
    async fn resolve_query_embedding(&self, query: &Query) -> Result<Vec<f32>> {
        if let Some(embedding) = &query.embedding {
            return Ok(embedding.clone());
        }

        let text = PromptBuilder::question_text(query);
        tracing::debug!("Embedding query text with {}", self.embedder.name());
        self.embedder.embed(text).await
    }
}
