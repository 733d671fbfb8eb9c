//! Error types for sevens-picker HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::SampleError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Nothing left to pick (404)
    #[error("No albums left to pick")]
    PoolExhausted,

    /// Upstream catalog refused or failed the token exchange (502)
    #[error("Upstream failure: {0}")]
    BadGateway(String),
}

impl From<SampleError> for ApiError {
    fn from(err: SampleError) -> Self {
        match err {
            SampleError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            SampleError::PoolExhausted => ApiError::PoolExhausted,
            SampleError::AuthFailure(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_code) = match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PoolExhausted => (StatusCode::NOT_FOUND, "POOL_EXHAUSTED"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
