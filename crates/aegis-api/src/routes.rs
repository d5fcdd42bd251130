//! Route definitions, grounded on the teacher's `openibank-api::routes::api_v1_routes`.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .nest("/api/v1", api_v1_routes())
}

fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions/payment-intent",
            post(handlers::payment_intent::create_payment_intent),
        )
        .route("/paystack/webhook", post(handlers::webhook::receive_webhook))
}
