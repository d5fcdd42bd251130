//! `POST /api/v1/paystack/webhook` (§4.4), grounded on `internal/webhook/handler.go`. The
//! original only logs the body and leaves a `//send to kafka here TODO`; this ingester closes
//! that gap by writing the verified payload into the outbox so it can actually reach the
//! webhook worker.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use uuid::Uuid;

use aegis_types::{event_types, EVENT_CHARGE_SUCCESS};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-paystack-signature";

pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing x-paystack-signature header"))?;

    if !aegis_psp::signature::verify(&body, signature, &state.config.psp.psp_webhook_secret) {
        return Err(ApiError::unauthorized("signature verification failed"));
    }

    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("malformed webhook body: {e}")))?;

    let event_name = event.get("event").and_then(|v| v.as_str()).unwrap_or_default();

    if event_name != EVENT_CHARGE_SUCCESS {
        tracing::debug!(event = event_name, "ignoring webhook event of uninteresting type");
        return Ok(StatusCode::OK);
    }

    let partition_key = event
        .get("data")
        .and_then(|d| d.get("metadata"))
        .and_then(|m| m.get("user_id"))
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or(Uuid::nil());

    aegis_db::OutboxRepo::insert(
        &state.db.pool,
        event_types::WEBHOOK_RECEIVED,
        event,
        partition_key,
        Uuid::new_v4(),
        state.config.event_log.max_retries as i32,
    )
    .await?;

    Ok(StatusCode::OK)
}
