//! Prompt definition types.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in grounded-answer prompt.
pub const DEFAULT_PROMPT_ID: &str = "grounded.answer.default";

const DEFAULT_PERSONA: &str = "You are a Seventh-day Adventist virtual assistant who specializes in providing clear, simple and objective answers based on the manual of the Seventh-day Adventist Church. Your role is to help users understand Adventist principles, practices and doctrines in a faithful manner and in line with the official teachings of the denomination. When answering, always use language that is accessible, direct and inspired by Adventist values, such as the importance of the Sabbath, holistic health, the second coming of Christ and the mission of the church. If the question is not directly related to the Adventist context, answer in a gentle way, bringing insights that reflect the Seventh-day Adventist vision. Avoid speculation or personal interpretations, always keeping in line with the official content of the church.";

const DEFAULT_TEMPLATE: &str = "{{persona}}
Answer the question, in {{language}}, based on the information below:

--- Relevant information taken from the {{source_title}} ---
{{context}}

--- User question ---
{{query}}
";

/// A grounded-answer prompt definition.
///
/// The template is rendered with `persona`, `language`, `source_title`,
/// `context` (retrieved texts) and `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Persona and answering policy preamble
    pub persona: String,

    /// Required output language
    pub language: String,

    /// Name of the grounding corpus, used to label the context block
    #[serde(rename = "sourceTitle")]
    pub source_title: String,

    /// Template string with Handlebars syntax
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

impl Default for PromptDefinition {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROMPT_ID.to_string(),
            title: "Grounded answer from the Church Manual".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            language: "portuguese (Brazil)".to_string(),
            source_title: "Seventh-day Adventist Church Manual".to_string(),
            template: default_template(),
        }
    }
}
