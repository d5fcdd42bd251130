use thiserror::Error;

/// Shared domain-level error kinds for the settlement pipeline.
///
/// Crate-specific errors (`aegis-db::DbError`, `aegis-cache::CacheError`, ...) convert into this
/// enum at the seams where a caller needs to reason about validation/auth/conflict/retry class
/// rather than the originating subsystem.
#[derive(Debug, Error, Clone)]
pub enum AegisError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("signature verification failed")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("retryable infrastructure error: {0}")]
    Retryable(String),

    #[error("poison message: {0}")]
    Poison(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl AegisError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable(msg.into())
    }

    pub fn poison(msg: impl Into<String>) -> Self {
        Self::Poison(msg.into())
    }

    /// Whether a worker should retry the message that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_) | Self::Conflict(_))
    }

    /// Stable machine-readable code, mirrored in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::Retryable(_) => "RETRYABLE",
            Self::Poison(_) => "POISON_MESSAGE",
            Self::Fatal(_) => "FATAL",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}

pub type AegisResult<T> = Result<T, AegisError>;
