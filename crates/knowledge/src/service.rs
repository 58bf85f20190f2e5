//! Query service: retrieval-augmented answering.

use crate::embeddings::EmbeddingProvider;
use crate::lifecycle::Lifecycle;
use crate::retriever::{Retriever, DEFAULT_TOP_K};
use crate::store::VectorStore;
use crate::types::QueryAnswer;
use fastrag_core::{AppError, AppResult};
use fastrag_llm::{aggregate, GenerationClient, GenerationConfig, GenerationRequest};
use fastrag_prompt::{PromptBuilder, CONTEXT_SEPARATOR};
use std::sync::Arc;
use std::time::Instant;

/// Detail returned when retrieval finds nothing to ground an answer on.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found";

/// Answers questions from the indexed corpus.
///
/// Every call is independent; the service holds no per-query state and can
/// be shared across tasks.
pub struct QueryService {
    lifecycle: Arc<Lifecycle>,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    prompts: PromptBuilder,
    generator: Arc<dyn GenerationClient>,
    generation: GenerationConfig,
    top_k: usize,
}

impl QueryService {
    pub fn new(
        lifecycle: Arc<Lifecycle>,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        prompts: PromptBuilder,
        generator: Arc<dyn GenerationClient>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            lifecycle,
            embedder,
            retriever: Retriever::new(store),
            prompts,
            generator,
            generation,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer `query` from the corpus.
    ///
    /// Embeds the query, retrieves the closest chunks, builds the grounded
    /// prompt, calls the generation service and aggregates its stream. The
    /// returned sources are the retrieved texts joined by a blank line, in
    /// retrieval order.
    pub async fn ask(&self, query: &str) -> AppResult<QueryAnswer> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Query cannot be empty".to_string()));
        }

        self.lifecycle.ensure_ready()?;

        let start = Instant::now();
        tracing::info!(query_len = query.len(), "Answering query");

        let query_embedding = self.embedder.embed(query).await?;
        let retrieved = self.retriever.retrieve(&query_embedding, self.top_k)?;

        if retrieved.is_empty() {
            tracing::warn!("No records retrieved for query");
            return Err(AppError::NotFound(NO_RELEVANT_INFORMATION.to_string()));
        }

        let texts = retrieved.texts();
        let sources = texts.join(CONTEXT_SEPARATOR);
        let prompt = self.prompts.build(query, &texts)?;

        let request = GenerationRequest::new(prompt, &self.generation);
        let stream = self.generator.generate(&request).await?;
        let answer = aggregate(stream).await?;

        tracing::info!(
            sources = retrieved.len(),
            answer_len = answer.text.len(),
            "Answered query in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        Ok(QueryAnswer {
            answer: answer.text,
            sources,
        })
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("state", &self.lifecycle.state())
            .field("embedder", &self.embedder)
            .field("prompts", &self.prompts)
            .field("generator", &self.generator.provider_name())
            .field("generation", &self.generation)
            .field("top_k", &self.top_k)
            .finish()
    }
}
