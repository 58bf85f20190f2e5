//! Command handlers for the fastrag CLI.

use fastrag_core::{AppError, AppResult};
use serde::Serialize;

pub mod ask;
pub mod index;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use index::IndexCommand;
pub use stats::StatsCommand;

/// Render `value` as pretty JSON for `--json` output.
pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output: {}", e)))
}
