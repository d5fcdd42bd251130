//! API error handling, grounded on the teacher's `openibank-api::error::ApiError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use aegis_types::AegisError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "code": self.code, "message": self.message }));
        (self.status, body).into_response()
    }
}

impl From<AegisError> for ApiError {
    fn from(err: AegisError) -> Self {
        let status = match &err {
            AegisError::Validation(_) => StatusCode::BAD_REQUEST,
            AegisError::Unauthorized => StatusCode::UNAUTHORIZED,
            AegisError::Conflict(_) => StatusCode::CONFLICT,
            AegisError::NotFound(_) => StatusCode::NOT_FOUND,
            AegisError::Retryable(_) | AegisError::Poison(_) | AegisError::Fatal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self::new(status, err.code(), err.to_string())
    }
}

impl From<aegis_db::DbError> for ApiError {
    fn from(err: aegis_db::DbError) -> Self {
        match err {
            aegis_db::DbError::Duplicate(msg) => Self::conflict(msg),
            aegis_db::DbError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            aegis_db::DbError::InvalidInput(msg) => Self::bad_request(msg),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", other.to_string()),
        }
    }
}

impl From<aegis_cache::CacheError> for ApiError {
    fn from(err: aegis_cache::CacheError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CACHE_ERROR", err.to_string())
    }
}

impl From<aegis_psp::PspError> for ApiError {
    fn from(err: aegis_psp::PspError) -> Self {
        match err {
            aegis_psp::PspError::Validation(msg) => Self::bad_request(msg),
            other => Self::new(StatusCode::BAD_GATEWAY, "PSP_ERROR", other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
