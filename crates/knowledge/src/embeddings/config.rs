//! Embedding configuration.

use fastrag_core::config::EmbeddingSettings;
use serde::{Deserialize, Serialize};

/// Embedding configuration for the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Base URL of the embedding service, for remote providers
    pub endpoint: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Maximum texts per embedding call during indexing
    pub batch_size: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::from(&EmbeddingSettings::default())
    }
}

impl From<&EmbeddingSettings> for EmbeddingConfig {
    fn from(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            endpoint: settings.endpoint.clone(),
            dimensions: settings.dimensions,
            batch_size: settings.batch_size,
            timeout_secs: settings.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "all-minilm");
        assert_eq!(config.dimensions, 384);
        assert_eq!(config.batch_size, 32);
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            provider: "trigram".to_string(),
            dimensions: 64,
            ..Default::default()
        };
        let config = EmbeddingConfig::from(&settings);
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.dimensions, 64);
    }
}
