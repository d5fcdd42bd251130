//! Request-level idempotency store (§4.1).
//!
//! Maps an opaque client-supplied key to one of three states — absent, pending, complete — with
//! an atomic check-and-set so two concurrent requests for the same key never both observe
//! `Fresh`. Used both for payment-intent creation (24h TTL) and PSP-reference dedup in the
//! webhook worker (30 minute TTL).

use std::time::Duration;

use deadpool_redis::Pool as RedisPool;
use redis::Script;

use crate::error::{CacheError, CacheResult};

/// Outcome of `check_and_set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyOutcome {
    /// No record existed; a `pending` marker was written under the caller's name.
    Fresh,
    /// Another caller's `check_and_set` is still in flight.
    InProgress,
    /// A prior call completed; carries the bytes passed to `mark_complete`.
    Complete(Vec<u8>),
}

/// Lua script making "check pending/complete, else write pending" a single round trip so two
/// concurrent callers can never both observe `Fresh` for the same key.
const CHECK_AND_SET: &str = r#"
local v = redis.call('GET', KEYS[1])
if v == false then
    redis.call('SET', KEYS[1], 'pending', 'EX', ARGV[1])
    return {'fresh', ''}
elseif v == 'pending' then
    return {'in_progress', ''}
else
    return {'complete', v}
end
"#;

pub struct IdempotencyStore {
    pool: RedisPool,
    key_prefix: String,
}

impl IdempotencyStore {
    pub fn new(pool: RedisPool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}idempotency:{}", self.key_prefix, key)
    }

    /// Atomic check-and-set. See `IdempotencyOutcome`.
    pub async fn check_and_set(&self, key: &str, ttl: Duration) -> CacheResult<IdempotencyOutcome> {
        let mut conn = self.pool.get().await?;
        let full_key = self.prefixed(key);

        let (tag, payload): (String, Vec<u8>) = Script::new(CHECK_AND_SET)
            .key(&full_key)
            .arg(ttl.as_secs())
            .invoke_async(&mut conn)
            .await?;

        match tag.as_str() {
            "fresh" => Ok(IdempotencyOutcome::Fresh),
            "in_progress" => Ok(IdempotencyOutcome::InProgress),
            "complete" => Ok(IdempotencyOutcome::Complete(payload)),
            other => Err(CacheError::Redis(format!(
                "unexpected check_and_set tag: {other}"
            ))),
        }
    }

    /// Overwrite the key with the completed response bytes, resetting its TTL.
    pub async fn mark_complete(&self, key: &str, bytes: &[u8], ttl: Duration) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let full_key = self.prefixed(key);

        redis::cmd("SET")
            .arg(&full_key)
            .arg(bytes)
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    /// Delete the key so the caller's request may be retried. Must be called whenever the
    /// `Fresh` branch errors before a `mark_complete`, or the key poisons the request for its TTL.
    pub async fn mark_failed(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let full_key = self.prefixed(key);

        redis::cmd("DEL")
            .arg(&full_key)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_from_env() -> Option<RedisPool> {
        let url = std::env::var("TEST_REDIS_URL").ok()?;
        let cfg = deadpool_redis::Config::from_url(url);
        cfg.create_pool(Some(deadpool_redis::Runtime::Tokio1)).ok()
    }

    #[tokio::test]
    #[ignore = "requires TEST_REDIS_URL"]
    async fn fresh_then_in_progress_then_complete() {
        let pool = pool_from_env().expect("TEST_REDIS_URL must point at a running Redis");
        let store = IdempotencyStore::new(pool, "aegis-test:".to_string());
        let key = format!("idem-{}", ulid::Ulid::new());

        let first = store.check_and_set(&key, Duration::from_secs(60)).await.unwrap();
        assert_eq!(first, IdempotencyOutcome::Fresh);

        let second = store.check_and_set(&key, Duration::from_secs(60)).await.unwrap();
        assert_eq!(second, IdempotencyOutcome::InProgress);

        store.mark_complete(&key, b"response-bytes", Duration::from_secs(60)).await.unwrap();

        let third = store.check_and_set(&key, Duration::from_secs(60)).await.unwrap();
        assert_eq!(third, IdempotencyOutcome::Complete(b"response-bytes".to_vec()));
    }

    #[tokio::test]
    #[ignore = "requires TEST_REDIS_URL"]
    async fn mark_failed_allows_retry() {
        let pool = pool_from_env().expect("TEST_REDIS_URL must point at a running Redis");
        let store = IdempotencyStore::new(pool, "aegis-test:".to_string());
        let key = format!("idem-{}", ulid::Ulid::new());

        store.check_and_set(&key, Duration::from_secs(60)).await.unwrap();
        store.mark_failed(&key).await.unwrap();

        let after = store.check_and_set(&key, Duration::from_secs(60)).await.unwrap();
        assert_eq!(after, IdempotencyOutcome::Fresh);
    }
}
