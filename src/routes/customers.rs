use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    models::{
        auth::{AdminCustomer, AuthenticatedCustomer},
        customer::CustomerResponse,
        rental::{CreateRentalRequest, CustomerRentalsQuery, Rental, RentalCreateResponse},
    },
    routes::{bad_request, internal_error, not_found, ApiError},
    services::{
        customers::CustomerService,
        rentals::{RentalError, RentalService},
    },
    AppState,
};

pub async fn get_customer(
    State(state): State<AppState>,
    _user: AuthenticatedCustomer,
    Path(customer_id): Path<i32>,
) -> Result<Json<CustomerResponse>, ApiError> {
    CustomerService::get(&state.db, customer_id)
        .await
        .map_err(internal_error)?
        .map(|c| Json(c.into()))
        .ok_or_else(|| not_found(format!("Customer with ID {customer_id} not found")))
}

/// Requires an admin token; the gate runs before the body is even parsed.
pub async fn create_rental(
    State(state): State<AppState>,
    AdminCustomer(admin): AdminCustomer,
    Path(customer_id): Path<i32>,
    Json(body): Json<CreateRentalRequest>,
) -> Result<(StatusCode, Json<RentalCreateResponse>), ApiError> {
    body.validate().map_err(bad_request)?;
    tracing::debug!(admin_id = admin.customer_id, customer_id, "Admin creating rental");

    match RentalService::create(&state.db, customer_id, &body).await {
        Ok(rental) => Ok((StatusCode::CREATED, Json(rental))),
        Err(
            e @ (RentalError::CustomerNotFound(_)
            | RentalError::InventoryNotFound(_)
            | RentalError::InventoryUnavailable(_)),
        ) => Err(bad_request(e.to_string())),
        Err(RentalError::Database(e)) => Err(internal_error(e)),
    }
}

pub async fn list_customer_rentals(
    State(state): State<AppState>,
    _user: AuthenticatedCustomer,
    Path(customer_id): Path<i32>,
    Query(query): Query<CustomerRentalsQuery>,
) -> Result<Json<Vec<Rental>>, ApiError> {
    RentalService::list_for_customer(&state.db, customer_id, query.active_only)
        .await
        .map(Json)
        .map_err(internal_error)
}
