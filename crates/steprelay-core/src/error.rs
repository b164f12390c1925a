//! Error types for the relay.

use thiserror::Error;

/// Relay error types.
///
/// Nothing here is ever surfaced to a stream consumer; the mirror consumes
/// every failure locally and logs it.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("step frame missing '{0}' key")]
    MissingField(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
