//! Health/readiness handlers (§6), grounded on the teacher's
//! `openibank-api::handlers::health::{health_check, readiness_check}`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Lightweight liveness probe; does not touch Postgres or Redis.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub postgres: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Checks Postgres connectivity. Redis is checked implicitly via the idempotency store's pool
/// being constructed at startup; a dead Redis surfaces as a 500 on the next payment-intent call
/// rather than here, matching the teacher's split between a cheap liveness probe and a readiness
/// probe that only checks the one dependency with a dedicated health-check method.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let postgres_healthy = state.db.health_check().await;

    let postgres = if postgres_healthy {
        ComponentStatus {
            status: "healthy".to_string(),
            error: None,
        }
    } else {
        ComponentStatus {
            status: "unhealthy".to_string(),
            error: Some("postgres health check failed".to_string()),
        }
    };

    let status_code = if postgres_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: if postgres_healthy { "ready" } else { "not_ready" }.to_string(),
            postgres,
        }),
    )
}
