use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Processed,
    Failed,
    Dlq,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Dlq => "dlq",
        }
    }
}

impl std::str::FromStr for OutboxStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processed" => Ok(Self::Processed),
            "failed" => Ok(Self::Failed),
            "dlq" => Ok(Self::Dlq),
            other => Err(format!("unknown outbox status: {other}")),
        }
    }
}

/// Event type names stamped onto `transaction_outbox.event_type`. These are distinct from the
/// event-log topic names they route to (see `aegis_eventlog::config`).
pub mod event_types {
    pub const PAYMENT_CREATED: &str = "payment.created";
    pub const WEBHOOK_RECEIVED: &str = "webhook.received";
    pub const LEDGER_ENTRY_CREATED: &str = "ledger.entry.created";
}

/// A row in `transaction_outbox`, co-transactional with the domain mutation it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxRow {
    pub id: i64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub partition_key: Uuid,
    pub correlation_id: Uuid,
    pub status: OutboxStatus,
    pub retry_count: i32,
    pub last_error: Option<String>,
    pub max_retries: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a `ledger.entry.created` outbox row (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryCreatedPayload {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub net_amount: i64,
    pub currency: String,
}
