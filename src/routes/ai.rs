use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::film::{FilmSummaryRequest, FilmSummaryResponse},
    routes::{bad_request, ApiError},
    services::ai::AiError,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub question: Option<String>,
}

fn ai_error(err: AiError) -> ApiError {
    let (status, message) = match &err {
        AiError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        AiError::FilmNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        AiError::EmptyResponse => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        AiError::InvalidResponse(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI response format is invalid".to_string(),
        ),
        AiError::Upstream(_) | AiError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process AI request".to_string(),
        ),
    };
    (status, Json(json!({ "error": message })))
}

pub async fn ask(
    State(state): State<AppState>,
    Query(query): Query<AskQuery>,
) -> Result<Json<String>, ApiError> {
    let question = query
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| bad_request("question is required"))?;

    state.ai.ask(&question).await.map(Json).map_err(ai_error)
}

pub async fn summary(
    State(state): State<AppState>,
    Json(body): Json<FilmSummaryRequest>,
) -> Result<Json<FilmSummaryResponse>, ApiError> {
    state
        .ai
        .film_summary(&state.db, body.film_id)
        .await
        .map(Json)
        .map_err(ai_error)
}
