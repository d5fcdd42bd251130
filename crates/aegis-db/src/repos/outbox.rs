//! Transaction outbox repository (§3 "TransactionOutbox", §4.3).

use sqlx::{PgExecutor, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use aegis_types::OutboxRow;

use crate::error::DbResult;
use crate::models::OutboxRowRecord;

pub struct OutboxRepo;

impl OutboxRepo {
    /// Insert an outbox row co-transactionally with the domain mutation it describes. `id` is
    /// assigned by the database's sequence and defines publish order within `partition_key`.
    pub async fn insert<'c, E>(
        executor: E,
        event_type: &str,
        payload: serde_json::Value,
        partition_key: Uuid,
        correlation_id: Uuid,
        max_retries: i32,
    ) -> DbResult<OutboxRow>
    where
        E: PgExecutor<'c>,
    {
        let row = sqlx::query_as::<_, OutboxRowRecord>(
            r#"
            INSERT INTO transaction_outbox
                (event_type, payload, partition_key, correlation_id, status, retry_count, max_retries)
            VALUES ($1, $2, $3, $4, 'pending', 0, $5)
            RETURNING id, event_type, payload, partition_key, correlation_id, status, retry_count,
                      last_error, max_retries, created_at, updated_at
            "#,
        )
        .bind(event_type)
        .bind(payload)
        .bind(partition_key)
        .bind(correlation_id)
        .bind(max_retries)
        .fetch_one(executor)
        .await?;

        row.try_into()
    }

    /// Select up to `limit` pending rows in `id` order with row-level `FOR UPDATE SKIP LOCKED` so
    /// multiple relay instances do not collide on the same row (§4.3 step 2). Must be called
    /// within `tx`; the caller commits after `mark_processed`.
    pub async fn fetch_pending_for_update(
        tx: &mut PgTransaction<'_, Postgres>,
        limit: i64,
    ) -> DbResult<Vec<OutboxRow>> {
        let rows = sqlx::query_as::<_, OutboxRowRecord>(
            r#"
            SELECT id, event_type, payload, partition_key, correlation_id, status, retry_count,
                   last_error, max_retries, created_at, updated_at
            FROM transaction_outbox
            WHERE status = 'pending'
            ORDER BY id ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(limit)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Flip the given ids to `processed` in one statement (§4.3 step 5).
    pub async fn mark_processed(
        tx: &mut PgTransaction<'_, Postgres>,
        ids: &[i64],
    ) -> DbResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE transaction_outbox
            SET status = 'processed', updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Move a row to `dlq` with its last error recorded. A consumer-side concern (§4.3 edge-case
    /// policy): the relay itself never calls this — see `aegis-eventlog`'s consumer retry loop.
    pub async fn mark_dlq<'c, E>(executor: E, id: i64, last_error: &str) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            r#"
            UPDATE transaction_outbox
            SET status = 'dlq', last_error = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(last_error)
        .bind(id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
