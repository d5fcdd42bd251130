//! Balance worker: finalizes a settled payment by moving funds out of `locked_balance` once the
//! ledger entries it depends on have landed (§4.6). Grounded on
//! `cmd/workers/balance/handler.go`.

use std::time::Duration;

use async_trait::async_trait;

use aegis_cache::LockStore;
use aegis_db::Database;
use aegis_eventlog::{Handler, Message};
use aegis_types::{AegisError, LedgerEntryCreatedPayload};

pub struct BalanceWorker {
    db: Database,
    locks: LockStore,
    lock_ttl: Duration,
    lock_max_retries: u32,
    lock_retry_delay: Duration,
}

impl BalanceWorker {
    pub fn new(db: Database, locks: LockStore) -> Self {
        Self {
            db,
            locks,
            lock_ttl: Duration::from_secs(10),
            lock_max_retries: 3,
            lock_retry_delay: Duration::from_millis(200),
        }
    }
}

#[async_trait]
impl Handler for BalanceWorker {
    async fn handle(&self, msg: &Message) -> Result<(), AegisError> {
        let event: LedgerEntryCreatedPayload = serde_json::from_slice(&msg.payload)
            .map_err(|e| AegisError::poison(format!("malformed balance update payload: {e}")))?;

        if event.net_amount <= 0 {
            tracing::warn!(
                user_id = %event.user_id,
                amount = event.net_amount,
                "skipping invalid balance update payload"
            );
            return Ok(());
        }

        let cancel = tokio_util::sync::CancellationToken::new();
        let lock = self
            .locks
            .try_acquire(
                &format!("wallet:{}", event.user_id),
                self.lock_ttl,
                self.lock_max_retries,
                self.lock_retry_delay,
                &cancel,
            )
            .await
            .map_err(|e| AegisError::retryable(format!("failed to acquire wallet lock: {e}")))?;

        let rows_affected = self
            .db
            .wallet_repo()
            .move_locked_to_balance(event.user_id, event.net_amount)
            .await
            .map_err(|e| AegisError::retryable(format!("failed to finalize balance move: {e}")));

        if let Err(e) = lock.release().await {
            tracing::warn!(error = %e, "failed to release wallet lock after balance update");
        }

        match rows_affected? {
            0 => {
                tracing::warn!(
                    user_id = %event.user_id,
                    amount = event.net_amount,
                    "no rows updated, balance already moved or insufficient locked funds"
                );
            }
            _ => {
                tracing::info!(
                    user_id = %event.user_id,
                    amount = event.net_amount,
                    "finalized balance move"
                );
            }
        }

        Ok(())
    }
}
