use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    models::{
        auth::AdminCustomer,
        rental::{OverdueQuery, Rental},
    },
    routes::{bad_request, internal_error, not_found, ApiError},
    services::rentals::RentalService,
    AppState,
};

pub async fn get_rental(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Path(rental_id): Path<i32>,
) -> Result<Json<Rental>, ApiError> {
    RentalService::get(&state.db, rental_id)
        .await
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("Rental with ID {rental_id} not found")))
}

pub async fn return_rental(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Path(rental_id): Path<i32>,
) -> Result<Json<Rental>, ApiError> {
    RentalService::return_rental(&state.db, rental_id)
        .await
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("Rental with ID {rental_id} not found")))
}

pub async fn list_overdue(
    State(state): State<AppState>,
    _admin: AdminCustomer,
    Query(query): Query<OverdueQuery>,
) -> Result<Json<Vec<Rental>>, ApiError> {
    if !(0..=OverdueQuery::MAX_DAYS).contains(&query.days) {
        return Err(bad_request(format!(
            "days must be between 0 and {}",
            OverdueQuery::MAX_DAYS
        )));
    }
    RentalService::overdue(&state.db, query.days)
        .await
        .map(Json)
        .map_err(internal_error)
}
