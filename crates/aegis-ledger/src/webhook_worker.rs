//! Webhook worker: the double-entry sequence that turns a confirmed PSP charge into wallet
//! movement (§4.5). Grounded on `cmd/workers/webhook/handler.go`.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use aegis_cache::{IdempotencyOutcome, IdempotencyStore, LockStore};
use aegis_db::{Database, LedgerRepo, OutboxRepo, TransactionRepo, WalletRepo, WebhookRepo};
use aegis_eventlog::{Handler, Message};
use aegis_types::{
    event_types, AegisError, LedgerEntryCreatedPayload, PspWebhookEvent, EVENT_CHARGE_SUCCESS,
    EXTERNAL_WALLET_ID, PLATFORM_WALLET_ID,
};

use crate::fee;

pub struct WebhookWorker {
    db: Database,
    idempotency: IdempotencyStore,
    locks: LockStore,
    fee_rate_bps: i64,
    idempotency_ttl: Duration,
    lock_ttl: Duration,
    lock_max_retries: u32,
    lock_retry_delay: Duration,
    outbox_max_retries: i32,
}

impl WebhookWorker {
    pub fn new(
        db: Database,
        idempotency: IdempotencyStore,
        locks: LockStore,
        fee_rate_bps: i64,
    ) -> Self {
        Self {
            db,
            idempotency,
            locks,
            fee_rate_bps,
            idempotency_ttl: Duration::from_secs(30 * 60),
            lock_ttl: Duration::from_secs(10),
            lock_max_retries: 3,
            lock_retry_delay: Duration::from_millis(200),
            outbox_max_retries: 5,
        }
    }

    async fn move_funds(
        &self,
        event: &PspWebhookEvent,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), AegisError> {
        let cancel = tokio_util::sync::CancellationToken::new();
        let lock = self
            .locks
            .try_acquire(
                &format!("wallet:{user_id}"),
                self.lock_ttl,
                self.lock_max_retries,
                self.lock_retry_delay,
                &cancel,
            )
            .await
            .map_err(|e| AegisError::retryable(format!("failed to acquire wallet lock: {e}")))?;

        let result = self.move_funds_locked(event, user_id, transaction_id).await;

        if let Err(e) = lock.release().await {
            tracing::warn!(error = %e, "failed to release wallet lock after webhook processing");
        }

        result
    }

    async fn move_funds_locked(
        &self,
        event: &PspWebhookEvent,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), AegisError> {
        let gross_amount = event.data.amount;
        let (platform_amount, net_amount) = fee::split(gross_amount, self.fee_rate_bps);

        let mut tx = self
            .db
            .pool
            .begin()
            .await
            .map_err(|e| AegisError::retryable(format!("failed to begin transaction: {e}")))?;

        let seller_balance_after =
            WalletRepo::increase_locked_balance_by_user(&mut *tx, user_id, net_amount)
                .await
                .map_err(|e| AegisError::retryable(format!("seller wallet update failed: {e}")))?;

        let platform_balance_after =
            WalletRepo::increase_balance_by_id(&mut *tx, PLATFORM_WALLET_ID, platform_amount)
                .await
                .map_err(|e| AegisError::retryable(format!("platform wallet update failed: {e}")))?;

        let external_balance_after =
            WalletRepo::increase_balance_by_id(&mut *tx, EXTERNAL_WALLET_ID, gross_amount)
                .await
                .map_err(|e| AegisError::retryable(format!("external wallet update failed: {e}")))?;

        LedgerRepo::insert_entry(
            &mut *tx,
            transaction_id,
            EXTERNAL_WALLET_ID,
            gross_amount,
            0,
            external_balance_after,
            "revenue",
        )
        .await
        .map_err(|e| AegisError::retryable(format!("external ledger entry failed: {e}")))?;

        LedgerRepo::insert_entry(
            &mut *tx,
            transaction_id,
            user_id,
            0,
            net_amount,
            seller_balance_after,
            "revenue",
        )
        .await
        .map_err(|e| AegisError::retryable(format!("seller ledger entry failed: {e}")))?;

        LedgerRepo::insert_entry(
            &mut *tx,
            transaction_id,
            PLATFORM_WALLET_ID,
            0,
            platform_amount,
            platform_balance_after,
            "fee",
        )
        .await
        .map_err(|e| AegisError::retryable(format!("platform ledger entry failed: {e}")))?;

        TransactionRepo::upsert_completed(
            &mut *tx,
            transaction_id,
            user_id,
            gross_amount,
            &event.data.currency,
            &event.data.reference,
        )
        .await
        .map_err(|e| AegisError::retryable(format!("transaction completion failed: {e}")))?;

        let balance_update = LedgerEntryCreatedPayload {
            transaction_id,
            user_id,
            net_amount,
            currency: event.data.currency.clone(),
        };
        let payload = serde_json::to_value(&balance_update)
            .map_err(|e| AegisError::Fatal(format!("failed to serialize balance update: {e}")))?;

        OutboxRepo::insert(
            &mut *tx,
            event_types::LEDGER_ENTRY_CREATED,
            payload,
            user_id,
            Uuid::new_v4(),
            self.outbox_max_retries,
        )
        .await
        .map_err(|e| AegisError::retryable(format!("outbox insert failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AegisError::retryable(format!("commit failed: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl Handler for WebhookWorker {
    async fn handle(&self, msg: &Message) -> Result<(), AegisError> {
        let event: PspWebhookEvent = serde_json::from_slice(&msg.payload)
            .map_err(|e| AegisError::poison(format!("malformed webhook payload: {e}")))?;

        if event.event != EVENT_CHARGE_SUCCESS {
            tracing::debug!(event = %event.event, "ignoring webhook event of uninteresting type");
            return Ok(());
        }

        let metadata = event
            .data
            .metadata
            .as_ref()
            .ok_or_else(|| AegisError::poison("webhook payload missing metadata block"))?;
        let user_id = metadata
            .user_id
            .ok_or_else(|| AegisError::poison("webhook metadata missing user_id"))?;
        let transaction_id = metadata
            .transaction_id
            .ok_or_else(|| AegisError::poison("webhook metadata missing transaction_id"))?;

        if event.data.amount <= 0 {
            tracing::warn!(
                user_id = %user_id,
                amount = event.data.amount,
                "skipping webhook with non-positive amount"
            );
            return Ok(());
        }

        match self
            .idempotency
            .check_and_set(&event.data.reference, self.idempotency_ttl)
            .await
        {
            Ok(IdempotencyOutcome::Complete(_)) => {
                tracing::info!(reference = %event.data.reference, "webhook already processed, skipping");
                return Ok(());
            }
            Ok(IdempotencyOutcome::InProgress) => {
                return Err(AegisError::retryable("webhook reference currently being processed"));
            }
            Ok(IdempotencyOutcome::Fresh) => {}
            Err(e) => return Err(AegisError::retryable(format!("idempotency check failed: {e}"))),
        }

        let payload_json = serde_json::to_value(&event)
            .map_err(|e| AegisError::Fatal(format!("failed to re-serialize webhook event: {e}")))?;
        if let Err(e) = WebhookRepo::insert(&self.db.pool, &event.data.id.to_string(), payload_json).await {
            tracing::warn!(error = %e, "failed to persist webhook audit row, continuing");
        }

        match self.move_funds(&event, user_id, transaction_id).await {
            Ok(()) => {
                self.idempotency
                    .mark_complete(&event.data.reference, b"processed", self.idempotency_ttl)
                    .await
                    .map_err(|e| AegisError::retryable(format!("failed to mark idempotency complete: {e}")))?;
                Ok(())
            }
            Err(e) => {
                if let Err(unmark_err) = self.idempotency.mark_failed(&event.data.reference).await {
                    tracing::warn!(error = %unmark_err, "failed to clear idempotency key after a failed attempt");
                }
                Err(e)
            }
        }
    }
}
