//! Retrieval-augmented answering over a single document corpus.
//!
//! The corpus is chunked and embedded once into a persistent SQLite vector
//! store; each question is embedded, matched against the stored chunks, and
//! answered by the generation service from the closest ones.

pub mod chunker;
pub mod corpus;
pub mod embeddings;
pub mod indexer;
pub mod lifecycle;
pub mod retriever;
pub mod service;
pub mod sqlite_store;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::{chunk_pages, chunk_text};
pub use corpus::load_pages;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use indexer::Indexer;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use retriever::Retriever;
pub use service::QueryService;
pub use sqlite_store::SqliteVectorStore;
pub use store::VectorStore;
pub use types::{
    Chunk, Embedding, IndexOutcome, QueryAnswer, RecordMetadata, RetrievalResult, ScoredRecord,
    StoreStats, VectorRecord,
};
