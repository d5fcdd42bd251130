pub mod ledger;
pub mod outbox;
pub mod transaction;
pub mod user;
pub mod wallet;
pub mod webhook;

pub use ledger::LedgerRepo;
pub use outbox::OutboxRepo;
pub use transaction::TransactionRepo;
pub use user::UserRepo;
pub use wallet::WalletRepo;
pub use webhook::WebhookRepo;
