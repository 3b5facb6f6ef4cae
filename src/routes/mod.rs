pub mod ai;
pub mod auth;
pub mod customers;
pub mod films;
pub mod health;
pub mod rentals;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub(crate) type ApiError = (StatusCode, Json<Value>);

pub(crate) fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %e, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message.into() })))
}

pub(crate) fn not_found(message: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message.into() })))
}
