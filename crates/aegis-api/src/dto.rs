//! Request/response bodies for the HTTP surface (§4.8).

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use aegis_types::is_supported_currency;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentIntentRequest {
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 1, message = "amount must be greater than zero"))]
    pub amount: i64,
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
    pub user_id: Uuid,
    pub callback_url: Option<String>,
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if is_supported_currency(currency) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_currency"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResponse {
    pub transaction_id: Uuid,
    pub authorization_url: String,
    pub reference: String,
}
