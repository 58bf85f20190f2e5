//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dense vector for a chunk or a query.
pub type Embedding = Vec<f32>;

/// A bounded slice of corpus text; the atomic retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential position rendered as a string ("0", "1", ...)
    pub id: String,

    /// Non-empty chunk text
    pub text: String,

    /// Position of the chunk within the corpus
    pub source_order: usize,
}

/// Metadata persisted alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Chunk text
    pub content: String,
}

/// The persisted unit in the vector store, one per chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Embedding,
    pub metadata: RecordMetadata,
}

/// A stored record matched by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,

    /// Cosine similarity to the query (higher is closer)
    pub score: f32,

    pub metadata: RecordMetadata,
}

/// Records ranked by descending similarity; at most `k` long.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub records: Vec<ScoredRecord>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Retrieved texts in rank order.
    pub fn texts(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.metadata.content.clone())
            .collect()
    }
}

/// Answer returned by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    /// Generated answer
    pub answer: String,

    /// Retrieved grounding texts, separated by a blank line
    pub sources: String,
}

/// Result of a startup indexing attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexOutcome {
    /// The store already held records; nothing was written
    Skipped { existing: usize },

    /// The corpus was chunked, embedded and stored
    Indexed {
        pages: usize,
        chunks: usize,
        duration_secs: f64,
    },
}

/// Statistics for the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored records
    pub records: usize,

    /// Embedding dimension fixed by the first write
    pub dimensions: Option<usize>,

    /// Completion time of the last indexing write
    pub last_indexed_at: Option<DateTime<Utc>>,
}
