//! Aegis API - HTTP surface for the settlement pipeline
//!
//! - `POST /api/v1/transactions/payment-intent` — idempotent payment-intent creation (§4.8)
//! - `POST /api/v1/paystack/webhook` — PSP webhook ingester (§4.4)
//! - `GET /health`, `GET /ready` — liveness/readiness (§6)

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the full router, wired to the given state and decorated with the teacher's
/// request-tracing middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    routes::router().with_state(state).layer(TraceLayer::new_for_http())
}
