use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An append-only double-entry row. Exactly one of `debit`/`credit` is non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub debit: i64,
    pub credit: i64,
    pub balance_after: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_balanced_pair(entries: &[LedgerEntry]) -> bool {
        let debits: i64 = entries.iter().map(|e| e.debit).sum();
        let credits: i64 = entries.iter().map(|e| e.credit).sum();
        debits == credits
    }
}
