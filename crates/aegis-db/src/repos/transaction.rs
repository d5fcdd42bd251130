//! Transaction repository (§3 "Transaction").

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use aegis_types::{Transaction, TransactionType};

use crate::error::{DbError, DbResult};
use crate::models::TransactionRow;

pub struct TransactionRepo {
    pool: PgPool,
}

impl TransactionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a `pending` transaction on payment-intent acceptance (§4.8). `idempotency_key` is
    /// unique per `(user_id, transaction_type)`.
    pub async fn create_pending(
        &self,
        user_id: Uuid,
        idempotency_key: &str,
        amount: i64,
        currency: &str,
        transaction_type: TransactionType,
    ) -> DbResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO transactions
                (id, idempotency_key, user_id, amount, currency, status, transaction_type)
            VALUES (gen_random_uuid(), $1, $2, $3, $4, 'pending', $5)
            RETURNING id, idempotency_key, user_id, amount, currency, psp_reference, status,
                      transaction_type, failure_reason, created_at, updated_at
            "#,
        )
        .bind(idempotency_key)
        .bind(user_id)
        .bind(amount)
        .bind(currency)
        .bind(transaction_type.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Duplicate(format!("idempotency_key {idempotency_key} already used"))
            }
            _ => DbError::from(e),
        })?;

        row.try_into()
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, idempotency_key, user_id, amount, currency, psp_reference, status,
                   transaction_type, failure_reason, created_at, updated_at
            FROM transactions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Mark a transaction `completed` with its PSP reference (§4.5 step 4.d). Composed into the
    /// webhook worker's single DB transaction. If the webhook arrived without a matching
    /// payment-intent row (`transaction_id` unknown), a new `completed` row is inserted directly
    /// rather than the update silently affecting zero rows.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_completed<'c, E>(
        executor: E,
        transaction_id: Uuid,
        user_id: Uuid,
        amount: i64,
        currency: &str,
        psp_reference: &str,
    ) -> DbResult<()>
    where
        E: PgExecutor<'c>,
    {
        sqlx::query(
            r#"
            INSERT INTO transactions
                (id, user_id, amount, currency, psp_reference, status, transaction_type)
            VALUES ($1, $2, $3, $4, $5, 'completed', 'payment_intent')
            ON CONFLICT (id) DO UPDATE
            SET psp_reference = excluded.psp_reference, status = 'completed', updated_at = NOW()
            "#,
        )
        .bind(transaction_id)
        .bind(user_id)
        .bind(amount)
        .bind(currency)
        .bind(psp_reference)
        .execute(executor)
        .await?;

        Ok(())
    }
}
