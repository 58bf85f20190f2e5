//! Top-k retrieval over the vector store.

use crate::store::VectorStore;
use crate::types::RetrievalResult;
use fastrag_core::{AppError, AppResult};
use std::sync::Arc;

/// Number of records retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Up to `k` stored records most similar to `query_embedding`, best
    /// first. An empty store yields an empty result, not an error.
    pub fn retrieve(&self, query_embedding: &[f32], k: usize) -> AppResult<RetrievalResult> {
        if k == 0 {
            return Err(AppError::Validation(
                "Retrieval count must be at least 1".to_string(),
            ));
        }

        let records = self.store.query(query_embedding, k)?;

        tracing::debug!(
            requested = k,
            returned = records.len(),
            top_score = records.first().map(|r| r.score),
            "Retrieved records"
        );

        Ok(RetrievalResult { records })
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever").finish_non_exhaustive()
    }
}
