// API Helper Functions
//
// Shared utilities used across API modules.

use axum::{http::StatusCode, Json};

use super::types::ApiError;
use crate::error::Error;

/// Standard error result type for API handlers
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Helper to create a 400 Bad Request error response
pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(message)))
}

/// Helper to create a 502 Bad Gateway error response
pub fn bad_gateway(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_GATEWAY, Json(ApiError::new(message)))
}

/// Helper to create a 500 Internal Server Error response
pub fn internal_error(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiError::new(message)))
}

/// Map a lookup failure onto an HTTP response. Decode failures come from
/// undecodable explorer data, so they are reported as upstream errors too.
pub fn lookup_error(e: &Error) -> (StatusCode, Json<ApiError>) {
    match e {
        Error::UnsupportedSource(_) => bad_request(e.to_string()),
        Error::Source(_) | Error::Decode { .. } => bad_gateway(e.to_string()),
    }
}
