//! Prompt builder: renders a grounded prompt from retrieved texts and a query.

use crate::loader::validate_prompt;
use crate::types::PromptDefinition;
use fastrag_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATE_NAME: &str = "prompt";

/// Separator between retrieved texts inside the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Serialize)]
struct PromptVariables<'a> {
    persona: &'a str,
    language: &'a str,
    source_title: &'a str,
    context: String,
    query: &'a str,
}

/// Renders prompts for one definition.
///
/// The template is compiled once; rendering is deterministic for a given
/// query and retrieval order.
pub struct PromptBuilder {
    definition: PromptDefinition,
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile a builder for `definition`.
    pub fn new(definition: PromptDefinition) -> AppResult<Self> {
        validate_prompt(&definition)?;

        let mut registry = Handlebars::new();

        // Plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(TEMPLATE_NAME, &definition.template)
            .map_err(|e| {
                AppError::Config(format!(
                    "Failed to compile prompt '{}': {}",
                    definition.id, e
                ))
            })?;

        Ok(Self {
            definition,
            registry,
        })
    }

    pub fn definition(&self) -> &PromptDefinition {
        &self.definition
    }

    /// Build the prompt: persona preamble, retrieved texts joined by a blank
    /// line in retrieval order, then the literal query.
    pub fn build(&self, query: &str, retrieved_texts: &[String]) -> AppResult<String> {
        let variables = PromptVariables {
            persona: &self.definition.persona,
            language: &self.definition.language,
            source_title: &self.definition.source_title,
            context: retrieved_texts.join(CONTEXT_SEPARATOR),
            query,
        };

        let rendered = self
            .registry
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Internal(format!("Failed to render prompt: {}", e)))?;

        tracing::debug!(
            prompt_id = %self.definition.id,
            contexts = retrieved_texts.len(),
            len = rendered.len(),
            "Built prompt"
        );

        Ok(rendered)
    }
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder")
            .field("prompt_id", &self.definition.id)
            .finish()
    }
}
