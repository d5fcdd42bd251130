//! `POST /api/v1/transactions/payment-intent` (§4.8), grounded on
//! `internal/transaction/{handler,service}.go`'s check-and-set / validate / insert / call-PSP /
//! mark-complete-or-failed sequence.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use aegis_cache::IdempotencyOutcome;
use aegis_psp::{InitializePaymentRequest, PaymentMetadata};
use aegis_types::TransactionType;

use crate::dto::{PaymentIntentRequest, PaymentIntentResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

const IDEMPOTENCY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub async fn create_payment_intent(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<PaymentIntentRequest>,
) -> ApiResult<Response> {
    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing Idempotency-Key header"))?
        .to_string();

    match state.idempotency.check_and_set(&idempotency_key, IDEMPOTENCY_TTL).await? {
        IdempotencyOutcome::InProgress => Err(ApiError::conflict("request in progress, retry later")),
        IdempotencyOutcome::Complete(bytes) => Ok(cached_response(bytes)),
        IdempotencyOutcome::Fresh => {
            match create_payment_intent_fresh(&state, &idempotency_key, &req).await {
                Ok(bytes) => {
                    state
                        .idempotency
                        .mark_complete(&idempotency_key, &bytes, IDEMPOTENCY_TTL)
                        .await?;
                    Ok(cached_response(bytes))
                }
                Err(e) => {
                    if let Err(unmark_err) = state.idempotency.mark_failed(&idempotency_key).await {
                        tracing::warn!(error = %unmark_err, "failed to clear idempotency key after a failed attempt");
                    }
                    Err(e)
                }
            }
        }
    }
}

async fn create_payment_intent_fresh(
    state: &AppState,
    idempotency_key: &str,
    req: &PaymentIntentRequest,
) -> ApiResult<Vec<u8>> {
    let transaction = state
        .db
        .transaction_repo()
        .create_pending(
            req.user_id,
            idempotency_key,
            req.amount,
            &req.currency,
            TransactionType::PaymentIntent,
        )
        .await?;

    let psp_request = InitializePaymentRequest {
        email: req.email.clone(),
        amount: req.amount,
        currency: req.currency.clone(),
        callback_url: req.callback_url.clone(),
        metadata: PaymentMetadata {
            user_id: req.user_id,
            transaction_id: transaction.id,
        },
    };

    let psp_response = state.psp.initialize_payment(&psp_request).await?;

    let response = PaymentIntentResponse {
        transaction_id: transaction.id,
        authorization_url: psp_response.data.authorization_url,
        reference: psp_response.data.reference,
    };

    serde_json::to_vec(&response)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "ENCODE_ERROR", e.to_string()))
}

/// Both the first response and any replay of a `Complete` outcome go through this path so the
/// bytes returned to the client are byte-for-byte identical on retry (§4.8).
fn cached_response(bytes: Vec<u8>) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], bytes).into_response()
}
