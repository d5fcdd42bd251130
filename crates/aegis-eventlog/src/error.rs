//! Error types for the event log adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error("publish timed out after the configured producer timeout")]
    PublishTimeout,

    #[error("consume error: {0}")]
    Consume(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventLogError {
    fn from(e: serde_json::Error) -> Self {
        EventLogError::Serialization(e.to_string())
    }
}

pub type EventLogResult<T> = Result<T, EventLogError>;
