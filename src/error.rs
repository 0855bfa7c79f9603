//! Error types for store operations.

use thiserror::Error;

/// An error from the backing search engine.
///
/// Write and query failures surface as a single store-level error; there is
/// no partial-success state. A write either fully succeeds and is visible,
/// or the caller sees one of these and must not assume persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or the transport failed mid-request.
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend rejected the request with an error status.
    #[error("store rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The backend answered with a body we could not interpret.
    #[error("malformed store response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = StoreError::Rejected {
            status: 500,
            body: "mapper_parsing_exception".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "store rejected request (HTTP 500): mapper_parsing_exception"
        );

        let err = StoreError::InvalidResponse("missing hits".to_string());
        assert_eq!(err.to_string(), "malformed store response: missing hits");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
