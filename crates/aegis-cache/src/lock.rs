//! Per-resource distributed lock over Redis (§4.2).
//!
//! `acquire` writes a unique owner token under the resource key only if absent. `release` and
//! `extend` are compare-and-swap Lua scripts so a lock re-acquired by another owner after TTL
//! expiry is never disturbed by a stale holder's release.

use std::time::Duration;

use deadpool_redis::Pool as RedisPool;
use redis::Script;

use crate::error::{CacheError, CacheResult};

const RELEASE_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#;

const EXTEND_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('EXPIRE', KEYS[1], ARGV[2])
else
    return 0
end
"#;

#[derive(Clone)]
pub struct LockStore {
    pool: RedisPool,
    key_prefix: String,
}

impl LockStore {
    pub fn new(pool: RedisPool, key_prefix: impl Into<String>) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
        }
    }

    fn prefixed(&self, resource: &str) -> String {
        format!("{}lock:{}", self.key_prefix, resource)
    }

    /// Attempt to acquire `resource` once. Fails immediately with `NotAcquired` if held.
    pub async fn acquire(&self, resource: &str, ttl: Duration) -> CacheResult<Lock> {
        let mut conn = self.pool.get().await?;
        let key = self.prefixed(resource);
        let token = ulid::Ulid::new().to_string();

        let set: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await?;

        if set.is_none() {
            return Err(CacheError::NotAcquired(resource.to_string()));
        }

        Ok(Lock {
            pool: self.pool.clone(),
            key,
            token,
        })
    }

    /// Repeat `acquire` with a cooperative sleep between attempts, up to `max_retries`.
    /// Returns `NotAcquired` if every attempt fails. Honors `cancel` between retries so a
    /// shutting-down worker does not spin forever on a contended lock.
    pub async fn try_acquire(
        &self,
        resource: &str,
        ttl: Duration,
        max_retries: u32,
        delay: Duration,
        cancel: &tokio_util::sync::CancellationToken,
    ) -> CacheResult<Lock> {
        let mut attempt = 0;
        loop {
            match self.acquire(resource, ttl).await {
                Ok(lock) => return Ok(lock),
                Err(CacheError::NotAcquired(_)) if attempt < max_retries => {
                    attempt += 1;
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            return Err(CacheError::NotAcquired(resource.to_string()));
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// A held lock. Dropping it without calling `release` leaves the key to expire via its TTL.
pub struct Lock {
    pool: RedisPool,
    key: String,
    token: String,
}

impl Lock {
    /// Delete the key only if `token` still matches (compare-and-delete).
    pub async fn release(&self) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .invoke_async(&mut conn)
            .await?;

        if deleted == 0 {
            return Err(CacheError::TokenMismatch);
        }
        Ok(())
    }

    /// Refresh the TTL only if `token` still matches.
    pub async fn extend(&self, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let extended: i64 = Script::new(EXTEND_SCRIPT)
            .key(&self.key)
            .arg(&self.token)
            .arg(ttl.as_secs())
            .invoke_async(&mut conn)
            .await?;

        if extended == 0 {
            return Err(CacheError::TokenMismatch);
        }
        Ok(())
    }

    pub fn token(&self) -> &str {
        &self.token
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
    async fn second_acquire_fails_until_release() {
        let pool = pool_from_env().expect("TEST_REDIS_URL must point at a running Redis");
        let store = LockStore::new(pool, "aegis-test:".to_string());
        let resource = format!("wallet:{}", ulid::Ulid::new());

        let lock = store.acquire(&resource, Duration::from_secs(5)).await.unwrap();
        let err = store.acquire(&resource, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, CacheError::NotAcquired(_)));

        lock.release().await.unwrap();
        store.acquire(&resource, Duration::from_secs(5)).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires TEST_REDIS_URL"]
    async fn release_does_not_affect_a_lock_reacquired_by_another_owner() {
        let pool = pool_from_env().expect("TEST_REDIS_URL must point at a running Redis");
        let store = LockStore::new(pool, "aegis-test:".to_string());
        let resource = format!("wallet:{}", ulid::Ulid::new());

        let stale = store.acquire(&resource, Duration::from_millis(100)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let fresh = store.acquire(&resource, Duration::from_secs(5)).await.unwrap();
        let err = stale.release().await.unwrap_err();
        assert!(matches!(err, CacheError::TokenMismatch));

        fresh.release().await.unwrap();
    }
}
