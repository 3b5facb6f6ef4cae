use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    middleware::auth::auth_rejection,
    models::auth::{AuthTokenResponse, AuthenticatedCustomer, LoginQuery},
    AppState,
};

/// Issue an access token for a customer id. There is no password exchange:
/// only trusted callers should be able to reach this route.
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<AuthTokenResponse>, (StatusCode, Json<Value>)> {
    let access_token = state
        .auth
        .issue_for(query.user_id)
        .await
        .map_err(auth_rejection)?;
    Ok(Json(AuthTokenResponse { access_token }))
}

pub async fn me(user: AuthenticatedCustomer) -> Json<AuthenticatedCustomer> {
    Json(user)
}
