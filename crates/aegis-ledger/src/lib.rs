//! Double-entry settlement logic: the webhook worker's fund-movement sequence, the balance
//! worker's locked-to-available finalization, the outbox relay, and fee computation.

pub mod balance_worker;
pub mod fee;
pub mod relay;
pub mod webhook_worker;

pub use balance_worker::BalanceWorker;
pub use relay::Relay;
pub use webhook_worker::WebhookWorker;
