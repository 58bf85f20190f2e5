//! Offline embedding provider built from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use crate::types::Embedding;
use fastrag_core::AppResult;
use std::collections::HashMap;

const MODEL_NAME: &str = "trigram-v1";

/// Function words that carry no retrieval signal (Portuguese and English).
const STOP_WORDS: &[&str] = &[
    "a", "o", "as", "os", "um", "uma", "de", "do", "da", "dos", "das", "em", "no", "na", "nos",
    "nas", "e", "ou", "que", "se", "por", "para", "com", "como", "ao", "aos", "é", "são", "the",
    "is", "at", "on", "an", "are", "was", "for", "to", "of", "in", "and", "or", "with", "by",
    "from", "this", "that", "it",
];

/// Deterministic, content-dependent embeddings without a model server.
///
/// Each word contributes its whole-word hash and the hashes of its
/// character trigrams (padded with boundary markers) to a fixed number of
/// buckets; the result is scaled to unit length. Lexical overlap, not
/// meaning, drives similarity. Suited to tests and offline use.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vector;
        }

        let lower = text.to_lowercase();
        let mut frequencies: HashMap<&str, usize> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, count) in frequencies {
            let weight = (count as f32).sqrt();

            vector[self.bucket(word.as_bytes())] += weight;

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(trigram.as_bytes())] += weight;
            }
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }

        vector
    }

    /// FNV-1a, reduced to a bucket index.
    fn bucket(&self, bytes: &[u8]) -> usize {
        let hash = bytes.iter().fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
            (acc ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
        });
        (hash % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}
