//! Ollama generation provider.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md
//! `POST /api/generate` streams newline-delimited JSON records by default.

use crate::client::{GenerationClient, GenerationRequest, GenerationStream};
use fastrag_core::{AppError, AppResult};
use futures::StreamExt;
use std::time::Duration;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const GENERATE_ENDPOINT: &str = "/api/generate";

/// Default bound on a whole generation call, body included.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama generation client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the default local endpoint.
    pub fn new() -> AppResult<Self> {
        Self::with_base_url(DEFAULT_OLLAMA_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom base URL and per-call timeout.
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::unreachable(format!("Generation request timed out: {}", e))
    } else {
        AppError::unreachable(format!("Failed to reach generation service: {}", e))
    }
}

#[async_trait::async_trait]
impl GenerationClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationStream> {
        let url = format!("{}{}", self.base_url, GENERATE_ENDPOINT);

        tracing::info!(model = %request.model, "Sending generation request to Ollama");
        tracing::debug!(
            prompt_len = request.prompt.len(),
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "Generation request"
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Ollama rejected generation request");
            return Err(AppError::ExternalService {
                status: Some(status.as_u16()),
                detail: body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(transport_error));

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::types::GenerationConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response and hand back the raw request.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/x-ndjson\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).to_string()
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new().unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            OllamaClient::with_base_url("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_generate_streams_body() {
        let body = concat!(
            "{\"model\":\"llama2\",\"response\":\"O sábado \",\"done\":false}\n",
            "{\"model\":\"llama2\",\"response\":\"é santo.\",\"done\":false}\n",
            "{\"model\":\"llama2\",\"response\":\"\",\"done\":true}\n",
        );
        let (url, server) = serve_once("200 OK", body).await;

        let client = OllamaClient::with_base_url(url, Duration::from_secs(5)).unwrap();
        let request = GenerationRequest::new("Pergunta?", &GenerationConfig::default());
        let stream = client.generate(&request).await.unwrap();
        let answer = aggregate(stream).await.unwrap();
        assert_eq!(answer.text, "O sábado é santo.");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/generate "));
        let sent = request_body(&raw);
        assert_eq!(sent["model"], "llama2");
        assert_eq!(sent["prompt"], "Pergunta?");
        assert_eq!(sent["max_tokens"], 128);
        assert_eq!(sent["temperature"], 0.0);
    }

    #[tokio::test]
    async fn test_error_status_carries_raw_body() {
        let (url, server) =
            serve_once("404 Not Found", "{\"error\":\"model 'llama2' not found\"}").await;

        let client = OllamaClient::with_base_url(url, Duration::from_secs(5)).unwrap();
        let request = GenerationRequest::new("Pergunta?", &GenerationConfig::default());

        match client.generate(&request).await {
            Err(AppError::ExternalService { status, detail }) => {
                assert_eq!(status, Some(404));
                assert_eq!(detail, "{\"error\":\"model 'llama2' not found\"}");
            }
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected an error for a 404 response"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            OllamaClient::with_base_url(format!("http://{}", addr), Duration::from_secs(5))
                .unwrap();
        let request = GenerationRequest::new("Pergunta?", &GenerationConfig::default());

        match client.generate(&request).await {
            Err(AppError::ExternalService { status, .. }) => assert_eq!(status, None),
            Err(other) => panic!("unexpected error: {:?}", other),
            Ok(_) => panic!("expected a connection error"),
        }
    }
}
