//! Error types for the form filling engine.
//!
//! Two families live in one enum:
//! - **Request-level** errors abort a fill request and are surfaced to the caller
//!   with a machine-readable [`ErrorKind`].
//! - **Field-level** errors are produced by individual setters. The filler catches,
//!   logs and skips them; they never reach the caller on their own.

use serde::Serialize;

/// Result type alias for form filling operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while filling a form.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required request input is missing or malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Template locator could not be dereferenced or yielded no bytes
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(String),

    /// Template bytes were fetched but are not a usable form document
    #[error("Template could not be loaded: {0}")]
    TemplateLoad(String),

    /// Not a single field was written
    #[error("No fields filled: {attempted} data keys matched nothing in the template")]
    NoFieldsFilled {
        /// Number of data keys that were attempted
        attempted: usize,
    },

    /// Filled document could not be persisted
    #[error("Persisting filled document failed: {0}")]
    PersistFailed(String),

    /// Filled document exceeds the configured payload ceiling
    #[error("Filled document is {size} bytes, above the ceiling of {ceiling} bytes")]
    PayloadTooLarge {
        /// Size of the filled document in bytes
        size: u64,
        /// Configured ceiling in bytes
        ceiling: u64,
    },

    /// Field does not exist in the template
    #[error("Form field not found: {0}")]
    FieldNotFound(String),

    /// Setter does not apply to the field's kind
    #[error("Field '{name}' is {found}, not {expected}")]
    FieldTypeMismatch {
        /// Field name
        name: String,
        /// Kind the setter requires
        expected: String,
        /// Kind the field actually has
        found: String,
    },

    /// Field carries the ReadOnly flag
    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    /// Radio/choice option is not offered by the field
    #[error("Field '{name}' has no option '{value}'")]
    OptionNotFound {
        /// Field name
        name: String,
        /// Requested option
        value: String,
    },

    /// Value cannot be projected onto the field
    #[error("Value for field '{name}' is not usable: {reason}")]
    UnparsableValue {
        /// Field name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF object model error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine-readable error category, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input from the caller
    InvalidRequest,
    /// Upstream template failure (missing, empty or unparsable)
    TemplateUnavailable,
    /// Template and data do not fit together
    FillFailed,
    /// Storage failure after a successful fill
    PersistFailed,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code for this category.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidRequest => 400,
            ErrorKind::TemplateUnavailable => 502,
            ErrorKind::FillFailed => 422,
            ErrorKind::PersistFailed | ErrorKind::Internal => 500,
        }
    }
}

impl Error {
    /// Categorize this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Error::TemplateUnavailable(_) | Error::TemplateLoad(_) => {
                ErrorKind::TemplateUnavailable
            },
            Error::NoFieldsFilled { .. }
            | Error::FieldNotFound(_)
            | Error::FieldTypeMismatch { .. }
            | Error::ReadOnlyField(_)
            | Error::OptionNotFound { .. }
            | Error::UnparsableValue { .. } => ErrorKind::FillFailed,
            Error::PersistFailed(_) | Error::PayloadTooLarge { .. } => ErrorKind::PersistFailed,
            Error::Io(_) | Error::Pdf(_) | Error::Json(_) => ErrorKind::Internal,
        }
    }

    /// Structured representation for callers.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            status: self.kind().status_code(),
            detail: self.to_string(),
        }
    }
}

/// Serializable error body returned at the request boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable category
    pub kind: ErrorKind,
    /// HTTP-style status code
    pub status: u16,
    /// Human-readable detail
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_fields_filled_error() {
        let err = Error::NoFieldsFilled { attempted: 7 };
        let msg = format!("{}", err);
        assert!(msg.contains("No fields filled"));
        assert!(msg.contains('7'));
        assert_eq!(err.kind(), ErrorKind::FillFailed);
    }

    #[test]
    fn test_template_errors_share_category() {
        let unavailable = Error::TemplateUnavailable("forms/a.pdf".to_string());
        let load = Error::TemplateLoad("not a PDF".to_string());
        assert_eq!(unavailable.kind(), ErrorKind::TemplateUnavailable);
        assert_eq!(load.kind(), ErrorKind::TemplateUnavailable);
        assert_eq!(load.kind().status_code(), 502);
    }

    #[test]
    fn test_four_request_categories_are_distinct() {
        let codes = [
            Error::InvalidRequest("x".into()).kind().status_code(),
            Error::TemplateUnavailable("x".into()).kind().status_code(),
            Error::NoFieldsFilled { attempted: 1 }.kind().status_code(),
            Error::PersistFailed("x".into()).kind().status_code(),
        ];
        assert_eq!(codes, [400, 502, 422, 500]);
    }

    #[test]
    fn test_payload_too_large_is_persist_failure() {
        let err = Error::PayloadTooLarge {
            size: 5_000_000,
            ceiling: 4_194_304,
        };
        assert_eq!(err.kind(), ErrorKind::PersistFailed);
        assert!(err.to_string().contains("4194304"));
    }

    #[test]
    fn test_error_response_serializes_kind() {
        let resp = Error::InvalidRequest("missing destinationId".into()).to_response();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"kind\":\"invalid_request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("missing destinationId"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
