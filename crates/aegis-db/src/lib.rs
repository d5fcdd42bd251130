//! Postgres persistence layer for the Aegis settlement pipeline.
//!
//! Grounded on the teacher's `openibank-db` crate: a single `Database` wrapping a `PgPool`,
//! per-domain repository structs, `sqlx::migrate!` at startup. Redis concerns (idempotency,
//! distributed lock) live in the sibling `aegis-cache` crate rather than here, since the spec
//! treats them as a distinct shared resource from the ledger's own tables.

pub mod error;
pub mod models;
pub mod repos;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use aegis_config::DatabaseConfig;

pub use error::{DbError, DbResult};
pub use repos::*;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("connecting to postgres");

        let pool = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .min_connections(config.pg_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.pg_acquire_timeout_secs))
            .connect(&config.postgres_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        info!("connected to postgres");

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> DbResult<()> {
        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;
        info!("migrations complete");
        Ok(())
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }

    pub fn user_repo(&self) -> UserRepo {
        UserRepo::new(self.pool.clone())
    }

    pub fn wallet_repo(&self) -> WalletRepo {
        WalletRepo::new(self.pool.clone())
    }

    pub fn transaction_repo(&self) -> TransactionRepo {
        TransactionRepo::new(self.pool.clone())
    }
}
