//! Thin PSP HTTP client wrapping Paystack's "initialize transaction" endpoint (§4.9), grounded on
//! `internal/psp/client.go`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PspError, PspResult};

#[derive(Debug, Clone, Serialize)]
pub struct InitializePaymentRequest {
    pub email: String,
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    pub metadata: PaymentMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentMetadata {
    pub user_id: Uuid,
    pub transaction_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitializePaymentResponse {
    pub status: bool,
    pub message: String,
    pub data: InitializePaymentData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitializePaymentData {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

pub struct PaystackClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl PaystackClient {
    pub fn new(secret_key: impl Into<String>, base_url: impl Into<String>) -> PspResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(50)
            .build()
            .map_err(|e| PspError::Retryable(e.to_string()))?;

        Ok(Self {
            http,
            secret_key: secret_key.into(),
            base_url: base_url.into(),
        })
    }

    pub async fn initialize_payment(
        &self,
        request: &InitializePaymentRequest,
    ) -> PspResult<InitializePaymentResponse> {
        let url = format!("{}/transaction/initialize", self.base_url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PspError::Timeout
                } else {
                    PspError::Retryable(e.to_string())
                }
            })?;

        let status = resp.status();

        if status.is_server_error() {
            return Err(PspError::Retryable(format!("psp returned {status}")));
        }
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PspError::Validation(format!("psp returned {status}: {body}")));
        }

        let parsed: InitializePaymentResponse = resp
            .json()
            .await
            .map_err(|e| PspError::Decode(e.to_string()))?;

        if !parsed.status {
            return Err(PspError::Validation(parsed.message));
        }

        Ok(parsed)
    }
}
