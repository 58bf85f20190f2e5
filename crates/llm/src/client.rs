//! Generation client abstraction and request types.

use crate::types::GenerationConfig;
use fastrag_core::AppResult;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Generation request body, sent as-is to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier (e.g., "llama2")
    pub model: String,

    /// Fully built prompt
    pub prompt: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature; pinned to 0.0 by default
    pub temperature: f32,
}

impl GenerationRequest {
    /// Create a request for `prompt` using the given configuration.
    pub fn new(prompt: impl Into<String>, config: &GenerationConfig) -> Self {
        Self {
            model: config.model.clone(),
            prompt: prompt.into(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Raw streamed response body, as transport chunks.
///
/// Chunk boundaries carry no meaning; the response aggregator re-splits the
/// bytes into records.
pub type GenerationStream = Pin<Box<dyn Stream<Item = AppResult<Vec<u8>>> + Send>>;

/// Trait for generation providers.
///
/// A provider only issues the request and checks the response status. It does
/// not interpret the body.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// Issue a generation request.
    ///
    /// # Errors
    /// `AppError::ExternalService` when the service is unreachable, times out,
    /// or answers with a non-success status (the raw body is the detail).
    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let config = GenerationConfig::default();
        let request = GenerationRequest::new("What is the Sabbath?", &config);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama2",
                "prompt": "What is the Sabbath?",
                "max_tokens": 128,
                "temperature": 0.0,
            })
        );
    }
}
