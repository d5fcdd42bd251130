use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PspWebhookStatus {
    Received,
    Error,
    Processed,
}

impl PspWebhookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Error => "error",
            Self::Processed => "processed",
        }
    }
}

impl std::str::FromStr for PspWebhookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            "error" => Ok(Self::Error),
            "processed" => Ok(Self::Processed),
            other => Err(format!("unknown psp webhook status: {other}")),
        }
    }
}

/// Raw signed payload captured for audit and replay (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PspWebhook {
    pub id: Uuid,
    pub event_id: String,
    pub payload: serde_json::Value,
    pub status: PspWebhookStatus,
    pub created_at: DateTime<Utc>,
}

/// Metadata block carried on a Paystack-style `charge.success` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMetadata {
    pub user_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookData {
    pub id: i64,
    pub reference: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PspWebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

pub const EVENT_CHARGE_SUCCESS: &str = "charge.success";
