//! Test doubles for the embedding and generation services.

use crate::embeddings::EmbeddingProvider;
use crate::types::Embedding;
use fastrag_core::{AppError, AppResult};
use fastrag_llm::{GenerationClient, GenerationRequest, GenerationStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds a text as the vector of the first keyword it contains.
#[derive(Debug)]
pub struct KeywordEmbedder {
    keywords: Vec<(&'static str, Embedding)>,
    fallback: Embedding,
    fail_from_batch: Option<usize>,
    batches: AtomicUsize,
    texts: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(fallback: Embedding) -> Self {
        Self {
            keywords: Vec::new(),
            fallback,
            fail_from_batch: None,
            batches: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, keyword: &'static str, vector: Embedding) -> Self {
        self.keywords.push((keyword, vector));
        self
    }

    /// Fail every batch from the given zero-based batch number on.
    pub fn failing_from(mut self, batch: usize) -> Self {
        self.fail_from_batch = Some(batch);
        self
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn texts(&self) -> usize {
        self.texts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.fallback.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        let batch = self.batches.fetch_add(1, Ordering::SeqCst);
        if matches!(self.fail_from_batch, Some(from) if batch >= from) {
            return Err(AppError::ExternalService {
                status: Some(500),
                detail: "embedding model crashed".to_string(),
            });
        }

        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                self.keywords
                    .iter()
                    .find(|(keyword, _)| text.contains(keyword))
                    .map(|(_, vector)| vector.clone())
                    .unwrap_or_else(|| self.fallback.clone())
            })
            .collect())
    }
}

/// Generation service that replays a canned response.
pub struct ScriptedGenerator {
    outcome: Result<Vec<Vec<u8>>, (u16, String)>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Stream `chunks` as the response body.
    pub fn answering(chunks: &[&str]) -> Self {
        Self {
            outcome: Ok(chunks.iter().map(|c| c.as_bytes().to_vec()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reject every request with `status` and raw `body`.
    pub fn rejecting(status: u16, body: &str) -> Self {
        Self {
            outcome: Err((status, body.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerationClient for ScriptedGenerator {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationStream> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.outcome {
            Ok(chunks) => {
                let items: Vec<AppResult<Vec<u8>>> = chunks.iter().cloned().map(Ok).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Err((status, body)) => Err(AppError::ExternalService {
                status: Some(*status),
                detail: body.clone(),
            }),
        }
    }
}

/// Scale `v` to unit length.
pub fn normalize(v: &[f32]) -> Embedding {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
