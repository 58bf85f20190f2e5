//! Prompt loader for YAML prompt definitions.

use crate::types::{PromptDefinition, DEFAULT_PROMPT_ID};
use fastrag_core::{AppError, AppResult};
use std::path::Path;

/// Placeholders every grounded template must reference.
const REQUIRED_PLACEHOLDERS: &[&str] = &["{{context}}", "{{query}}"];

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `.fastrag/prompts/<id>.yml`.
///
/// # Example
/// ```no_run
/// use fastrag_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "manual.en")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".fastrag/prompts")
        .join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Config(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Config(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Config(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve the prompt to use: a workspace definition when an ID is given and
/// it is not the built-in one, the built-in definition otherwise.
pub fn resolve_prompt(workspace_path: &Path, prompt_id: Option<&str>) -> AppResult<PromptDefinition> {
    match prompt_id {
        Some(id) if id != DEFAULT_PROMPT_ID => load_prompt(workspace_path, id),
        _ => Ok(PromptDefinition::default()),
    }
}

/// Validate a prompt definition.
///
/// A grounded prompt must carry a persona, an output language, and reference
/// both the retrieved context and the user query.
pub fn validate_prompt(definition: &PromptDefinition) -> AppResult<()> {
    if definition.id.trim().is_empty() {
        return Err(AppError::Config("Prompt ID cannot be empty".to_string()));
    }

    if definition.persona.trim().is_empty() {
        return Err(AppError::Config(format!(
            "Prompt '{}' has no persona",
            definition.id
        )));
    }

    if definition.language.trim().is_empty() {
        return Err(AppError::Config(format!(
            "Prompt '{}' has no output language",
            definition.id
        )));
    }

    for placeholder in REQUIRED_PLACEHOLDERS {
        if !definition.template.contains(placeholder) {
            return Err(AppError::Config(format!(
                "Prompt '{}' template does not reference {}",
                definition.id, placeholder
            )));
        }
    }

    Ok(())
}
