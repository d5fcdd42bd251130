//! Canonical domain types shared across the Aegis settlement pipeline.
//!
//! This crate has no dependency on any other `aegis-*` crate, mirroring the teacher's
//! foundation-layer convention (`openibank-types`): it only defines shapes and pure helpers,
//! never I/O.

pub mod error;
pub mod ledger;
pub mod outbox;
pub mod transaction;
pub mod user;
pub mod wallet;
pub mod webhook;

pub use error::{AegisError, AegisResult};
pub use ledger::LedgerEntry;
pub use outbox::{event_types, LedgerEntryCreatedPayload, OutboxRow, OutboxStatus};
pub use transaction::{is_supported_currency, Transaction, TransactionStatus, TransactionType};
pub use user::User;
pub use wallet::{Wallet, WalletType, EXTERNAL_WALLET_ID, PLATFORM_WALLET_ID};
pub use webhook::{PspWebhook, PspWebhookEvent, PspWebhookStatus, EVENT_CHARGE_SUCCESS};
