//! Prompt system for fastrag.
//!
//! Builds the grounded prompt sent to the generation service:
//! - Built-in grounded-answer definition (persona, language, corpus label)
//! - Optional YAML overrides under `.fastrag/prompts/`
//! - Handlebars rendering with escaping disabled

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{PromptBuilder, CONTEXT_SEPARATOR};
pub use loader::{load_prompt, resolve_prompt, validate_prompt};
pub use types::{PromptDefinition, DEFAULT_PROMPT_ID};
