//! Error types for the dashboard API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use dispatch::DispatchError;
use thiserror::Error;

/// Errors that can occur in dashboard handlers.
#[derive(Debug, Error)]
pub enum WebError {
    /// No usable `x-user-id` header.
    #[error("{0}")]
    Unauthorized(String),

    /// Rejected request input.
    #[error("{0}")]
    BadRequest(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Dispatch error.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn database_status(err: &DatabaseError) -> StatusCode {
    match err {
        DatabaseError::NotFound { .. } => StatusCode::NOT_FOUND,
        DatabaseError::Invalid(_) => StatusCode::BAD_REQUEST,
        DatabaseError::AlreadyExists { .. } => StatusCode::CONFLICT,
        DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Database(err) => database_status(err),
            WebError::Dispatch(DispatchError::Database(err)) => database_status(err),
            WebError::Dispatch(_) | WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            WebError::Database(err) | WebError::Dispatch(DispatchError::Database(err)) => {
                err.to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for dashboard handlers.
pub type Result<T> = std::result::Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use database::ValidationError;

    #[test]
    fn test_status_mapping() {
        let not_found = WebError::Database(DatabaseError::NotFound {
            entity: "Client",
            id: "1".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = WebError::Dispatch(DispatchError::Database(DatabaseError::Invalid(
            ValidationError::InvalidPhone("12".to_string()),
        )));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            WebError::Unauthorized("missing".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebError::Dispatch(DispatchError::Config("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
