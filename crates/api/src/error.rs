//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::EngineError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed identity claim.
    Unauthorized,
    /// Valid identity, insufficient privilege.
    Forbidden(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Lifecycle engine error.
    Engine(EngineError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, partial) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized access".to_string(),
                false,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, false),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Engine(err) => engine_error_to_response(err),
        };

        let body = if partial {
            // The caller must reconcile; a retry would not be safe.
            serde_json::json!({ "error": message, "partial_effect": true })
        } else {
            serde_json::json!({ "error": message })
        };
        (status, axum::Json(body)).into_response()
    }
}

fn engine_error_to_response(err: EngineError) -> (StatusCode, String, bool) {
    match &err {
        EngineError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string(), false),
        EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string(), false),
        EngineError::Conflict(_) => (StatusCode::CONFLICT, err.to_string(), false),
        EngineError::PreconditionFailed(_) => (StatusCode::BAD_REQUEST, err.to_string(), false),
        EngineError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string(), false),
        EngineError::Inconsistent(msg) => {
            tracing::error!(error = %msg, "partial effect requires reconciliation");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), true)
        }
        EngineError::Store(e) => {
            tracing::error!(error = %e, "document store failure");
            (StatusCode::BAD_GATEWAY, err.to_string(), false)
        }
        EngineError::Provider(e) => {
            tracing::error!(error = %e, "payment provider failure");
            (StatusCode::BAD_GATEWAY, err.to_string(), false)
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}
