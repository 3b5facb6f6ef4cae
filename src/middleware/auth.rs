use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::auth::{AdminCustomer, AuthenticatedCustomer},
    services::auth::AuthError,
    AppState,
};

type Rejection = (StatusCode, Json<Value>);

/// The single externally visible auth failure. The internal reason is logged,
/// never returned.
pub fn unauthorized() -> Rejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid credentials" })),
    )
}

pub fn auth_rejection(err: AuthError) -> Rejection {
    if err.is_rejection() {
        tracing::debug!(reason = %err, "Authentication rejected");
        unauthorized()
    } else {
        tracing::error!(error = %err, "Authentication failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, Rejection> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(unauthorized)
}

impl FromRequestParts<AppState> for AuthenticatedCustomer {
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.auth.authenticate(token).await.map_err(auth_rejection)
    }
}

impl FromRequestParts<AppState> for AdminCustomer {
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        state.auth.authenticate_admin(token).await.map_err(auth_rejection)
    }
}
