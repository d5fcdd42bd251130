//! Redis-backed idempotency store and distributed lock shared across the Aegis settlement
//! pipeline (§4.1, §4.2).
//!
//! Grounded on the teacher's `openibank-db::cache::CacheManager` for the pooled-connection idiom,
//! generalized from ad-hoc `SET NX` calls into the atomic check-and-set and CAS-release contracts
//! the spec requires.

pub mod error;
pub mod idempotency;
pub mod lock;

pub use error::{CacheError, CacheResult};
pub use idempotency::{IdempotencyOutcome, IdempotencyStore};
pub use lock::{Lock, LockStore};
