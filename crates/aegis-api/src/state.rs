//! Application state shared across handlers, grounded on the teacher's
//! `openibank-api::state::AppState`.

use std::sync::Arc;

use aegis_cache::IdempotencyStore;
use aegis_config::AegisConfig;
use aegis_db::Database;
use aegis_psp::PaystackClient;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub idempotency: Arc<IdempotencyStore>,
    pub psp: Arc<PaystackClient>,
    pub config: Arc<AegisConfig>,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        idempotency: Arc<IdempotencyStore>,
        psp: Arc<PaystackClient>,
        config: Arc<AegisConfig>,
    ) -> Self {
        Self {
            db,
            idempotency,
            psp,
            config,
        }
    }
}
