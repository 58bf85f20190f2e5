//! Ollama embedding provider.
//!
//! Embeds text through Ollama's local `POST /api/embeddings` endpoint, one
//! request per text. Requests are not retried.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use crate::types::Embedding;
use async_trait::async_trait;
use fastrag_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    /// HTTP client for API requests
    client: Client,
    /// Ollama API base URL
    base_url: String,
    /// Model name (e.g., "all-minilm")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a provider from configuration. No request is made until the
    /// first embedding call.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Config(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_single(&self, text: &str) -> AppResult<Embedding> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::unreachable(format!("Embedding request timed out: {}", e))
                } else {
                    AppError::unreachable(format!("Failed to reach embedding service: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Ollama rejected embedding request");
            return Err(AppError::ExternalService {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::ExternalService {
                status: Some(status.as_u16()),
                detail: format!("Failed to parse embedding response: {}", e),
            }
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::ExternalService {
                status: Some(status.as_u16()),
                detail: format!(
                    "Model '{}' returned {} dimensions, expected {}",
                    self.model,
                    body.embedding.len(),
                    self.dimensions
                ),
            });
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Embedding>> {
        if let Some(position) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "Cannot embed empty text (batch position {})",
                position
            )));
        }

        // Sequential: the endpoint takes one prompt per request
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_single(text).await?);
        }

        debug!("Embedded batch of {} texts", embeddings.len());
        Ok(embeddings)
    }
}
