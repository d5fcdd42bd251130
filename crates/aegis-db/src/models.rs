//! Row shapes as they come back from Postgres, converted into `aegis_types` domain structs at
//! the repository boundary. Enum-typed columns are stored as `TEXT`; conversion goes through
//! `FromStr` impls defined in `aegis_types` so an unrecognized value is a hard error rather than
//! a silently truncated enum discriminant.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use aegis_types::{
    LedgerEntry, OutboxRow, OutboxStatus, PspWebhook, PspWebhookStatus, Transaction,
    TransactionStatus, TransactionType, User, Wallet, WalletType,
};

use crate::error::{DbError, DbResult};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct WalletRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub locked_balance: i64,
    pub currency: String,
    pub wallet_type: String,
}

impl TryFrom<WalletRow> for Wallet {
    type Error = DbError;

    fn try_from(r: WalletRow) -> DbResult<Self> {
        Ok(Wallet {
            id: r.id,
            user_id: r.user_id,
            balance: r.balance,
            locked_balance: r.locked_balance,
            currency: r.currency,
            wallet_type: r
                .wallet_type
                .parse::<WalletType>()
                .map_err(DbError::InvalidInput)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub idempotency_key: Option<String>,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub psp_reference: Option<String>,
    pub status: String,
    pub transaction_type: String,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(r: TransactionRow) -> DbResult<Self> {
        Ok(Transaction {
            id: r.id,
            idempotency_key: r.idempotency_key,
            user_id: r.user_id,
            amount: r.amount,
            currency: r.currency,
            psp_reference: r.psp_reference,
            status: r
                .status
                .parse::<TransactionStatus>()
                .map_err(DbError::InvalidInput)?,
            transaction_type: r
                .transaction_type
                .parse::<TransactionType>()
                .map_err(DbError::InvalidInput)?,
            failure_reason: r.failure_reason,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct LedgerEntryRow {
    pub id: i64,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub debit: i64,
    pub credit: i64,
    pub balance_after: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntryRow> for LedgerEntry {
    fn from(r: LedgerEntryRow) -> Self {
        LedgerEntry {
            id: r.id,
            transaction_id: r.transaction_id,
            account_id: r.account_id,
            debit: r.debit,
            credit: r.credit,
            balance_after: r.balance_after,
            description: r.description,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OutboxRowRecord {
    pub id: i64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub partition_key: Uuid,
    pub correlation_id: Uuid,
    pub status: String,
    pub retry_count: i32,
    pub last_error: Option<String>,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OutboxRowRecord> for OutboxRow {
    type Error = DbError;

    fn try_from(r: OutboxRowRecord) -> DbResult<Self> {
        Ok(OutboxRow {
            id: r.id,
            event_type: r.event_type,
            payload: r.payload,
            partition_key: r.partition_key,
            correlation_id: r.correlation_id,
            status: r.status.parse::<OutboxStatus>().map_err(DbError::InvalidInput)?,
            retry_count: r.retry_count,
            last_error: r.last_error,
            max_retries: r.max_retries,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PspWebhookRow {
    pub id: Uuid,
    pub event_id: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PspWebhookRow> for PspWebhook {
    type Error = DbError;

    fn try_from(r: PspWebhookRow) -> DbResult<Self> {
        Ok(PspWebhook {
            id: r.id,
            event_id: r.event_id,
            payload: r.payload,
            status: r.status.parse::<PspWebhookStatus>().map_err(DbError::InvalidInput)?,
            created_at: r.created_at,
        })
    }
}
