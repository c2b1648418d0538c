//! Error types for vapi-client.

use thiserror::Error;

/// Errors that can occur when talking to the assistant registry.
///
/// These stay inside the crate's soft-failure methods, which log them and
/// return an empty result; the `try_*` methods expose them directly.
#[derive(Debug, Error)]
pub enum VapiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Non-success status from the API.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
