//! Vector store abstraction.
//!
//! A store holds one record per chunk (id, embedding, content metadata) and
//! answers nearest-neighbour queries by cosine similarity.

use crate::types::{Embedding, RecordMetadata, ScoredRecord, StoreStats};
use fastrag_core::{AppError, AppResult};

/// Trait for vector store backends.
///
/// Implementations must:
/// - apply `add` atomically: either every record is stored or none is
/// - reject embeddings whose dimension differs from the stored one
/// - return query results by descending similarity, ties in insertion order
/// - tolerate concurrent readers
pub trait VectorStore: Send + Sync {
    /// Number of stored records.
    fn count(&self) -> AppResult<usize>;

    /// Store records given as parallel sequences.
    fn add(
        &self,
        ids: &[String],
        embeddings: &[Embedding],
        metadatas: &[RecordMetadata],
    ) -> AppResult<()>;

    /// Up to `n_results` records most similar to `embedding`.
    fn query(&self, embedding: &[f32], n_results: usize) -> AppResult<Vec<ScoredRecord>>;

    /// Get statistics about the store.
    fn stats(&self) -> AppResult<StoreStats>;
}

/// Check that parallel `add` inputs line up and share one dimension.
///
/// Returns the common dimension, or `None` for an empty batch.
pub fn validate_batch(
    ids: &[String],
    embeddings: &[Embedding],
    metadatas: &[RecordMetadata],
) -> AppResult<Option<usize>> {
    if ids.len() != embeddings.len() || ids.len() != metadatas.len() {
        return Err(AppError::Validation(format!(
            "Mismatched batch lengths: {} ids, {} embeddings, {} metadatas",
            ids.len(),
            embeddings.len(),
            metadatas.len()
        )));
    }

    let Some(first) = embeddings.first() else {
        return Ok(None);
    };

    let dimension = first.len();
    if dimension == 0 {
        return Err(AppError::Validation("Embeddings cannot be empty".to_string()));
    }

    if let Some((position, embedding)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, e)| e.len() != dimension)
    {
        return Err(AppError::Validation(format!(
            "Embedding '{}' has {} dimensions, expected {}",
            ids[position],
            embedding.len(),
            dimension
        )));
    }

    Ok(Some(dimension))
}

/// Calculate cosine similarity between two vectors.
///
/// Zero-length or zero-norm vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Sort by descending score and keep the best `n`.
///
/// The sort is stable, so equal scores keep the input (insertion) order.
/// A NaN score ranks below every real score.
pub fn rank(mut records: Vec<ScoredRecord>, n: usize) -> Vec<ScoredRecord> {
    records.sort_by(|a, b| sort_key(b.score).total_cmp(&sort_key(a.score)));
    records.truncate(n);
    records
}

fn sort_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, score: f32) -> ScoredRecord {
        ScoredRecord {
            id: id.to_string(),
            score,
            metadata: RecordMetadata {
                content: id.to_string(),
            },
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&c, &d).abs() < 0.001);

        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let records = vec![
            scored("0", 0.5),
            scored("1", 0.9),
            scored("2", 0.5),
            scored("3", 0.5),
        ];

        let ranked = rank(records, 3);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "0", "2"]);
    }

    #[test]
    fn test_rank_puts_nan_scores_last() {
        let huge = [1e30_f32, 1e30];
        let nan = cosine_similarity(&huge, &huge);
        assert!(nan.is_nan());

        let records = vec![
            scored("0", nan),
            scored("1", -0.5),
            scored("2", 0.9),
            scored("3", f32::NAN),
            scored("4", 0.1),
        ];

        let ranked = rank(records, 5);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "4", "1", "0", "3"]);
    }

    #[test]
    fn test_validate_batch() {
        let ids = vec!["0".to_string(), "1".to_string()];
        let metadatas = vec![
            RecordMetadata {
                content: "a".to_string(),
            },
            RecordMetadata {
                content: "b".to_string(),
            },
        ];

        let ok = validate_batch(&ids, &[vec![1.0, 0.0], vec![0.0, 1.0]], &metadatas).unwrap();
        assert_eq!(ok, Some(2));

        let ragged = validate_batch(&ids, &[vec![1.0, 0.0], vec![0.0]], &metadatas);
        assert!(matches!(ragged, Err(AppError::Validation(_))));

        let short = validate_batch(&ids, &[vec![1.0, 0.0]], &metadatas);
        assert!(matches!(short, Err(AppError::Validation(_))));

        assert_eq!(validate_batch(&[], &[], &[]).unwrap(), None);
    }
}
