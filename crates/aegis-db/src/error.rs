//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
}

impl From<aegis_types::AegisError> for DbError {
    fn from(e: aegis_types::AegisError) -> Self {
        DbError::InvalidInput(e.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
