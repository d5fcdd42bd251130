//! `ValidatedJson` extractor, grounded on the teacher's `openibank-api::extractors::ValidatedJson`
//! (trimmed of the permission/2FA extractors that accompany it there, since Aegis's HTTP surface
//! has no auth layer).

use async_trait::async_trait;
use axum::{
    extract::FromRequest,
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(req: Request<axum::body::Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()).into_response())?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request(format_validation_errors(&e)).into_response())?;

        Ok(ValidatedJson(value))
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field}: validation failed"))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}
