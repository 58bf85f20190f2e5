//! Generation provider factory.

use crate::client::GenerationClient;
use crate::providers::OllamaClient;
use crate::types::ProviderType;
use fastrag_core::config::GenerationSettings;
use fastrag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Bound on each generation call, body included
///
/// # Errors
/// `AppError::Config` if the provider is unknown or the HTTP client cannot be
/// built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn GenerationClient>> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url, timeout)?;
            Ok(Arc::new(client))
        }
        None => Err(AppError::Config(format!(
            "Unknown generation provider: {}",
            provider
        ))),
    }
}

/// Create a generation client from configuration settings.
pub fn client_from_settings(settings: &GenerationSettings) -> AppResult<Arc<dyn GenerationClient>> {
    create_client(
        &settings.provider,
        Some(&settings.endpoint),
        Duration::from_secs(settings.timeout_secs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, Duration::from_secs(10)).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_from_settings() {
        let client = client_from_settings(&GenerationSettings::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("openai", None, Duration::from_secs(10)) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown generation provider")),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
