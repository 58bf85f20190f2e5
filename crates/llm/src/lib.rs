//! Generation integration for fastrag.
//!
//! This crate talks to the generative model service and turns its streamed
//! answer into text:
//! - `GenerationClient`: provider-agnostic request/response-status contract
//! - `OllamaClient`: the Ollama implementation
//! - `ResponseAggregator`: the newline-delimited record parser
//!
//! # Example
//! ```no_run
//! use fastrag_llm::{aggregate, GenerationClient, GenerationConfig, GenerationRequest, OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new()?;
//! let request = GenerationRequest::new("Hello, world!", &GenerationConfig::default());
//! let answer = aggregate(client.generate(&request).await?).await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use aggregator::{aggregate, aggregate_body, AggregatorState, ResponseAggregator};
pub use client::{GenerationClient, GenerationRequest, GenerationStream};
pub use factory::{client_from_settings, create_client};
pub use providers::OllamaClient;
pub use types::{AggregatedAnswer, GenerationConfig, GenerationToken, ProviderType};
