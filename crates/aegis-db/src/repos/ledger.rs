//! Ledger entry repository (§3 "LedgerEntry"). Append-only; no update or delete methods exist.

use sqlx::PgExecutor;
use uuid::Uuid;

use aegis_types::LedgerEntry;

use crate::error::DbResult;
use crate::models::LedgerEntryRow;

pub struct LedgerRepo;

impl LedgerRepo {
    /// Insert one double-entry row. Exactly one of `debit`/`credit` should be non-zero; callers
    /// (the webhook worker) are responsible for balancing the set of rows within a transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_entry<'c, E>(
        executor: E,
        transaction_id: Uuid,
        account_id: Uuid,
        debit: i64,
        credit: i64,
        balance_after: i64,
        description: &str,
    ) -> DbResult<LedgerEntry>
    where
        E: PgExecutor<'c>,
    {
        let row = sqlx::query_as::<_, LedgerEntryRow>(
            r#"
            INSERT INTO ledger_entries
                (transaction_id, account_id, debit, credit, balance_after, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, transaction_id, account_id, debit, credit, balance_after, description, created_at
            "#,
        )
        .bind(transaction_id)
        .bind(account_id)
        .bind(debit)
        .bind(credit)
        .bind(balance_after)
        .bind(description)
        .fetch_one(executor)
        .await?;

        Ok(row.into())
    }

    pub async fn list_by_transaction<'c, E>(
        executor: E,
        transaction_id: Uuid,
    ) -> DbResult<Vec<LedgerEntry>>
    where
        E: PgExecutor<'c>,
    {
        let rows = sqlx::query_as::<_, LedgerEntryRow>(
            r#"
            SELECT id, transaction_id, account_id, debit, credit, balance_after, description, created_at
            FROM ledger_entries
            WHERE transaction_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(transaction_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
