//! Error types for the Redis-backed idempotency store and distributed lock.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis pool error: {0}")]
    Pool(String),

    #[error("redis command error: {0}")]
    Redis(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("lock not acquired: {0}")]
    NotAcquired(String),

    #[error("lock token mismatch, owned by another holder")]
    TokenMismatch,
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        CacheError::Pool(e.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Redis(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
