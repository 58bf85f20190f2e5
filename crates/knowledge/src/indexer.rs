//! One-time corpus indexing.

use crate::chunker::chunk_pages;
use crate::embeddings::EmbeddingProvider;
use crate::store::VectorStore;
use crate::types::{Embedding, IndexOutcome, RecordMetadata};
use fastrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Instant;

/// Texts sent to the embedding provider per call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Chunks, embeds and stores the corpus, but only into an empty store.
pub struct Indexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
    batch_size: usize,
}

impl Indexer {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        chunk_size: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            chunk_size,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Populate the store from `pages` if it holds no records.
    ///
    /// A non-empty store is left untouched, whatever the corpus. Chunk ids
    /// are "0", "1", ... in chunk order and every chunk is written in one
    /// atomic batch, so a failure part-way leaves the store empty.
    pub async fn index_if_empty<S: AsRef<str>>(&self, pages: &[S]) -> AppResult<IndexOutcome> {
        let existing = self.store.count()?;
        if existing > 0 {
            let stored = self.store.stats()?.dimensions;
            if let Some(stored) = stored {
                if stored != self.embedder.dimensions() {
                    return Err(AppError::Config(format!(
                        "Store holds {}-dimensional vectors but provider '{}' (model: {}) produces {}; remove the store to re-index",
                        stored,
                        self.embedder.provider_name(),
                        self.embedder.model_name(),
                        self.embedder.dimensions()
                    )));
                }
            }

            tracing::info!("Store already holds {} records; skipping indexing", existing);
            return Ok(IndexOutcome::Skipped { existing });
        }

        let start = Instant::now();

        tracing::info!(
            "Indexing {} pages using provider '{}' (model: {})",
            pages.len(),
            self.embedder.provider_name(),
            self.embedder.model_name()
        );

        let chunks = chunk_pages(pages, self.chunk_size)?;
        if chunks.is_empty() {
            tracing::warn!("Corpus produced no chunks; store stays empty");
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings: Vec<Embedding> = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let batch_embeddings = self.embedder.embed_batch(batch).await?;
            if batch_embeddings.len() != batch.len() {
                return Err(AppError::Internal(format!(
                    "Embedding provider returned {} vectors for {} texts",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }
            embeddings.extend(batch_embeddings);

            tracing::debug!("Embedded {}/{} chunks", embeddings.len(), texts.len());
        }

        let ids: Vec<String> = chunks.iter().map(|c| c.id.clone()).collect();
        let metadatas: Vec<RecordMetadata> = chunks
            .into_iter()
            .map(|c| RecordMetadata { content: c.text })
            .collect();

        self.store.add(&ids, &embeddings, &metadatas)?;

        let duration = start.elapsed();
        tracing::info!(
            "Indexed {} chunks from {} pages in {:.2}s",
            ids.len(),
            pages.len(),
            duration.as_secs_f64()
        );

        Ok(IndexOutcome::Indexed {
            pages: pages.len(),
            chunks: ids.len(),
            duration_secs: duration.as_secs_f64(),
        })
    }
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("embedder", &self.embedder)
            .field("chunk_size", &self.chunk_size)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
