//! PSP client error types (§4.9), distinguishing the class that governs the payment-intent
//! handler's `mark_failed` policy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PspError {
    #[error("psp rejected the request: {0}")]
    Validation(String),

    #[error("psp transient error: {0}")]
    Retryable(String),

    #[error("psp request timed out")]
    Timeout,

    #[error("failed to parse psp response: {0}")]
    Decode(String),
}

impl PspError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_) | Self::Timeout)
    }
}

pub type PspResult<T> = Result<T, PspError>;
