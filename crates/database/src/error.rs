//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found, or owned by another user.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Input rejected before reaching the database.
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Map a unique-constraint violation into `AlreadyExists`.
    pub(crate) fn from_insert(err: sqlx::Error, entity: &'static str, id: impl ToString) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
