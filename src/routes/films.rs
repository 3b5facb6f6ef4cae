use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    models::{
        auth::AdminCustomer,
        film::{
            CreateFilmRequest, FilmCreateResponse, FilmListQuery, FilmListResponse, FilmResponse,
            UpdateFilmRequest,
        },
    },
    routes::{bad_request, internal_error, not_found, ApiError},
    services::films::FilmService,
    AppState,
};

fn film_not_found(film_id: i32) -> ApiError {
    not_found(format!("Film with ID {film_id} not found"))
}

pub async fn list_films(
    State(state): State<AppState>,
    Query(query): Query<FilmListQuery>,
) -> Result<Json<FilmListResponse>, ApiError> {
    query.validate().map_err(bad_request)?;

    let (films, total) = FilmService::list(&state.db, &query)
        .await
        .map_err(internal_error)?;

    Ok(Json(FilmListResponse {
        films: films.into_iter().map(FilmResponse::from).collect(),
        total,
        page: query.page,
        page_size: query.page_size,
    }))
}

pub async fn get_film(
    State(state): State<AppState>,
    Path(film_id): Path<i32>,
) -> Result<Json<FilmResponse>, ApiError> {
    FilmService::get(&state.db, film_id)
        .await
        .map_err(internal_error)?
        .map(|f| Json(f.into()))
        .ok_or_else(|| film_not_found(film_id))
}

/// First match for the upper-cased title, or `null`.
pub async fn search_film(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Option<FilmResponse>>, ApiError> {
    let film = FilmService::find_by_title(&state.db, &title.to_uppercase())
        .await
        .map_err(internal_error)?;
    Ok(Json(film.map(FilmResponse::from)))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    FilmService::categories(&state.db)
        .await
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_film(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Json(body): Json<CreateFilmRequest>,
) -> Result<(StatusCode, Json<FilmCreateResponse>), ApiError> {
    body.validate().map_err(bad_request)?;

    let film_id = FilmService::create(&state.db, &body)
        .await
        .map_err(internal_error)?;

    Ok((
        StatusCode::CREATED,
        Json(FilmCreateResponse {
            film_id,
            message: "Film created successfully".to_string(),
        }),
    ))
}

pub async fn update_film(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Path(film_id): Path<i32>,
    Json(body): Json<UpdateFilmRequest>,
) -> Result<Json<FilmResponse>, ApiError> {
    body.validate().map_err(bad_request)?;

    FilmService::update(&state.db, film_id, &body)
        .await
        .map_err(internal_error)?
        .map(|f| Json(f.into()))
        .ok_or_else(|| film_not_found(film_id))
}

pub async fn delete_film(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Path(film_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    match FilmService::delete(&state.db, film_id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(film_not_found(film_id)),
        Err(e) => Err(internal_error(e)),
    }
}
