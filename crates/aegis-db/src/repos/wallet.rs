//! Wallet repository (§3 "Wallet", §4.5, §4.6).
//!
//! Every mutating method takes `impl PgExecutor<'c>` so callers can run a single call against the
//! pool directly, or thread a `&mut sqlx::Transaction` through it to compose multiple mutations
//! (wallets + ledger_entries + transactions + transaction_outbox) into one commit, as the webhook
//! worker's double-entry sequence requires.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use aegis_types::{Wallet, WalletType, EXTERNAL_WALLET_ID, PLATFORM_WALLET_ID};

use crate::error::{DbError, DbResult};
use crate::models::WalletRow;

pub struct WalletRepo {
    pool: PgPool,
}

impl WalletRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user's holding wallet. Idempotent in spirit but not in implementation: callers
    /// (ambient user-onboarding CRUD) must not call this twice for the same user.
    pub async fn create(
        &self,
        user_id: Uuid,
        currency: &str,
        wallet_type: WalletType,
    ) -> DbResult<Wallet> {
        let row = sqlx::query_as::<_, WalletRow>(
            r#"
            INSERT INTO wallets (id, user_id, balance, locked_balance, currency, wallet_type)
            VALUES (gen_random_uuid(), $1, 0, 0, $2, $3)
            RETURNING id, user_id, balance, locked_balance, currency, wallet_type
            "#,
        )
        .bind(user_id)
        .bind(currency)
        .bind(wallet_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    /// Ensure the two reserved system wallets exist; called once at startup.
    pub async fn ensure_system_wallets(&self, currency: &str) -> DbResult<()> {
        for (id, wallet_type) in [
            (PLATFORM_WALLET_ID, WalletType::Revenue),
            (EXTERNAL_WALLET_ID, WalletType::Settlement),
        ] {
            sqlx::query(
                r#"
                INSERT INTO wallets (id, user_id, balance, locked_balance, currency, wallet_type)
                VALUES ($1, $1, 0, 0, $2, $3)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(currency)
            .bind(wallet_type.as_str())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Wallet>> {
        let row = sqlx::query_as::<_, WalletRow>(
            "SELECT id, user_id, balance, locked_balance, currency, wallet_type FROM wallets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// The user's holding wallet, excluding the two system wallets.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<Wallet>> {
        let row = sqlx::query_as::<_, WalletRow>(
            r#"
            SELECT id, user_id, balance, locked_balance, currency, wallet_type
            FROM wallets
            WHERE user_id = $1 AND wallet_type = 'holding'
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// `locked_balance += amount` on the seller's wallet (§4.5 step 4.b). Returns the captured
    /// post-mutation balance for the ledger entry's `balance_after`.
    pub async fn increase_locked_balance_by_user<'c, E>(
        executor: E,
        user_id: Uuid,
        amount: i64,
    ) -> DbResult<i64>
    where
        E: PgExecutor<'c>,
    {
        let (locked_balance,): (i64,) = sqlx::query_as(
            r#"
            UPDATE wallets
            SET locked_balance = locked_balance + $1, updated_at = NOW()
            WHERE user_id = $2 AND wallet_type = 'holding'
            RETURNING locked_balance
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("holding wallet for user {user_id}")))?;

        Ok(locked_balance)
    }

    /// `balance += amount` on a wallet identified by id (platform/external system wallets).
    pub async fn increase_balance_by_id<'c, E>(
        executor: E,
        wallet_id: Uuid,
        amount: i64,
    ) -> DbResult<i64>
    where
        E: PgExecutor<'c>,
    {
        let (balance,): (i64,) = sqlx::query_as(
            r#"
            UPDATE wallets
            SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(wallet_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("wallet {wallet_id}")))?;

        Ok(balance)
    }

    /// Conditional move from `locked_balance` to `balance` (§4.6 step 3). Zero rows affected
    /// means the move already happened or funds are insufficient — both are a safe no-op.
    pub async fn move_locked_to_balance(&self, user_id: Uuid, amount: i64) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE wallets
            SET locked_balance = locked_balance - $1,
                balance = balance + $1,
                updated_at = NOW()
            WHERE user_id = $2 AND wallet_type = 'holding' AND locked_balance >= $1
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_wallet_ids_are_distinct() {
        assert_ne!(PLATFORM_WALLET_ID, EXTERNAL_WALLET_ID);
    }
}
