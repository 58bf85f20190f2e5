//! Error types for the fastrag service.
//!
//! A single error enum covers every failure a component can report. Each
//! variant belongs to one `ErrorKind`, and only the outermost boundary turns a
//! kind into a user-visible status.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for fastrag.
///
/// All fallible functions return `Result<T, AppError>`. Errors are values and
/// propagate to the boundary unchanged; nothing is retried locally.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (chunk size, empty query, mismatched batches)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No relevant chunks were retrieved for a query
    #[error("Not found: {0}")]
    NotFound(String),

    /// Embedding or generation service unreachable, timed out, or answered
    /// with a non-success status. `detail` holds the raw response body when
    /// the service answered.
    #[error("{}", external_message(.status, .detail))]
    ExternalService { status: Option<u16>, detail: String },

    /// A streamed generation record could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The generation stream ended before a record with `done = true`
    #[error("Incomplete stream: {0}")]
    IncompleteStream(String),

    /// Vector store failures
    #[error("Store error: {0}")]
    Store(String),

    /// Anything unanticipated
    #[error("Internal error: {0}")]
    Internal(String),
}

fn external_message(status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(status) => format!("External service error ({}): {}", status, detail),
        None => format!("External service error: {}", detail),
    }
}

/// Coarse error classification used at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    ExternalService,
    Parse,
    IncompleteStream,
    Internal,
}

impl AppError {
    /// Shorthand for an external failure that produced no response.
    pub fn unreachable(detail: impl Into<String>) -> Self {
        AppError::ExternalService {
            status: None,
            detail: detail.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::ExternalService { .. } => ErrorKind::ExternalService,
            AppError::Parse(_) => ErrorKind::Parse,
            AppError::IncompleteStream(_) => ErrorKind::IncompleteStream,
            AppError::Config(_) | AppError::Io(_) | AppError::Store(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Status reported at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Parse | ErrorKind::IncompleteStream => 502,
            ErrorKind::ExternalService => 503,
            ErrorKind::Internal => 500,
        }
    }

    /// Human-readable detail for the boundary.
    ///
    /// For an external service that answered with an error status this is the
    /// raw response body, verbatim.
    pub fn detail(&self) -> String {
        match self {
            AppError::ExternalService { detail, .. } => detail.clone(),
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Parse(msg)
            | AppError::IncompleteStream(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Boundary representation of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub kind: ErrorKind,
    pub detail: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            status: err.status_code(),
            kind: err.kind(),
            detail: err.detail(),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_distinct_per_kind() {
        let errors = [
            AppError::Validation("bad".into()),
            AppError::NotFound("none".into()),
            AppError::unreachable("down"),
            AppError::Parse("garbage".into()),
            AppError::Internal("oops".into()),
        ];
        let codes: Vec<u16> = errors.iter().map(|e| e.status_code()).collect();
        assert_eq!(codes, vec![400, 404, 503, 502, 500]);
    }

    #[test]
    fn test_external_detail_is_raw_body() {
        let err = AppError::ExternalService {
            status: Some(500),
            detail: "{\"error\":\"model not found\"}".to_string(),
        };
        assert_eq!(err.detail(), "{\"error\":\"model not found\"}");
        assert!(err.to_string().contains("(500)"));

        let response = ErrorResponse::from(&err);
        assert_eq!(response.status, 503);
        assert_eq!(response.kind, ErrorKind::ExternalService);
        assert_eq!(response.detail, "{\"error\":\"model not found\"}");
    }

    #[test]
    fn test_store_and_config_map_to_internal() {
        assert_eq!(AppError::Store("locked".into()).kind(), ErrorKind::Internal);
        assert_eq!(AppError::Config("bad".into()).status_code(), 500);
    }

    #[test]
    fn test_incomplete_stream_kind() {
        let err = AppError::IncompleteStream("no done record".into());
        assert_eq!(err.kind(), ErrorKind::IncompleteStream);
        assert_eq!(err.detail(), "no done record");
    }

    #[test]
    fn test_error_response_serializes_kind_in_snake_case() {
        let response = ErrorResponse::from(&AppError::IncompleteStream("cut".into()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], 502);
        assert_eq!(value["kind"], "incomplete_stream");
        assert_eq!(value["detail"], "cut");
    }
}
