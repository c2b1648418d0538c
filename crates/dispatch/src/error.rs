//! Error types for dispatch operations.

use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while orchestrating campaign and assistant actions.
///
/// Registry and webhook failures are not errors here: they are reported in
/// the returned outcome types instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Database operation failed, including not-found and not-owned lookups.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Payload or selection could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DispatchError {
    /// Whether this wraps a not-found (or not-owned) lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchError::Database(DatabaseError::NotFound { .. }))
    }
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
