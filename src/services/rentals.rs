use std::time::Instant;

use chrono::{Duration, Utc};
use sqlx::{postgres::PgExecutor, PgPool};
use thiserror::Error;

use crate::{
    models::rental::{CreateRentalRequest, Rental, RentalCreateResponse, RENTAL_COLUMNS},
    services::customers::CustomerService,
};

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("Customer with ID {0} not found")]
    CustomerNotFound(i32),
    #[error("Inventory item {0} not found")]
    InventoryNotFound(i32),
    #[error("Inventory item {0} is currently rented out")]
    InventoryUnavailable(i32),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Locks the inventory row and yields its film title (NULL if the film is gone).
const LOCK_INVENTORY_SQL: &str = "SELECT f.title FROM inventory i
     LEFT JOIN film f ON f.film_id = i.film_id
     WHERE i.inventory_id = $1
     FOR UPDATE OF i";

const OPEN_RENTAL_EXISTS_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM rental WHERE inventory_id = $1 AND return_date IS NULL)";

impl From<sqlx::Error> for RentalError {
    fn from(e: sqlx::Error) -> Self {
        RentalError::Database(e.into())
    }
}

pub struct RentalService;

impl RentalService {
    /// Create a rental for `customer_id` if the inventory item is not
    /// currently out.
    ///
    /// The inventory row is locked for the rest of the transaction, so two
    /// requests for the same item are serialized and only one of them sees it
    /// as available.
    pub async fn create(
        pool: &PgPool,
        customer_id: i32,
        req: &CreateRentalRequest,
    ) -> Result<RentalCreateResponse, RentalError> {
        let start = Instant::now();
        tracing::debug!(customer_id, inventory_id = req.inventory_id, "Creating rental");

        if CustomerService::get(pool, customer_id).await?.is_none() {
            tracing::error!(customer_id, "Customer not found for rental");
            return Err(RentalError::CustomerNotFound(customer_id));
        }

        let mut tx = pool.begin().await?;

        let locked: Option<Option<String>> = sqlx::query_scalar(LOCK_INVENTORY_SQL)
            .bind(req.inventory_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(film_title) = locked else {
            tracing::warn!(inventory_id = req.inventory_id, "Inventory item not found for rental");
            return Err(RentalError::InventoryNotFound(req.inventory_id));
        };

        if !Self::is_inventory_available(&mut *tx, req.inventory_id).await? {
            tracing::warn!(inventory_id = req.inventory_id, "Inventory not available for rental");
            return Err(RentalError::InventoryUnavailable(req.inventory_id));
        }

        let rental = sqlx::query_as::<_, Rental>(&format!(
            "INSERT INTO rental (rental_date, inventory_id, customer_id, staff_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {RENTAL_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(req.inventory_id)
        .bind(customer_id)
        .bind(req.staff_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let film_title = film_title.unwrap_or_else(|| "Unknown".to_string());

        tracing::info!(
            rental_id = rental.rental_id,
            customer_id,
            film_title = %film_title,
            duration_ms = start.elapsed().as_millis() as u64,
            "Rental created successfully"
        );

        Ok(RentalCreateResponse {
            rental_id: rental.rental_id,
            customer_id,
            inventory_id: rental.inventory_id,
            film_title,
            rental_date: rental.rental_date,
            message: "Rental created successfully".to_string(),
        })
    }

    /// True when the item has no open rental.
    pub async fn is_inventory_available<'e, E>(executor: E, inventory_id: i32) -> anyhow::Result<bool>
    where
        E: PgExecutor<'e>,
    {
        let open: bool = sqlx::query_scalar(OPEN_RENTAL_EXISTS_SQL)
            .bind(inventory_id)
            .fetch_one(executor)
            .await?;
        Ok(!open)
    }

    pub async fn get(pool: &PgPool, rental_id: i32) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rental WHERE rental_id = $1"
        ))
        .bind(rental_id)
        .fetch_optional(pool)
        .await?;
        Ok(rental)
    }

    /// Newest first. With `active_only`, rentals already returned are skipped.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: i32,
        active_only: bool,
    ) -> anyhow::Result<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rental
             WHERE customer_id = $1 AND ($2 = FALSE OR return_date IS NULL)
             ORDER BY rental_date DESC"
        ))
        .bind(customer_id)
        .bind(active_only)
        .fetch_all(pool)
        .await?;
        tracing::debug!(customer_id, rental_count = rentals.len(), "Customer rentals retrieved");
        Ok(rentals)
    }

    /// Mark a rental as returned now. `None` if the rental does not exist.
    pub async fn return_rental(pool: &PgPool, rental_id: i32) -> anyhow::Result<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "UPDATE rental SET return_date = NOW(), last_update = NOW()
             WHERE rental_id = $1
             RETURNING {RENTAL_COLUMNS}"
        ))
        .bind(rental_id)
        .fetch_optional(pool)
        .await?;
        match &rental {
            Some(_) => tracing::info!(rental_id, "Rental returned"),
            None => tracing::warn!(rental_id, "Rental not found for return"),
        }
        Ok(rental)
    }

    /// Open rentals taken out more than `days_overdue` days ago, oldest first.
    pub async fn overdue(pool: &PgPool, days_overdue: i64) -> anyhow::Result<Vec<Rental>> {
        let cutoff = Utc::now() - Duration::days(days_overdue);
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rental
             WHERE return_date IS NULL AND rental_date < $1
             ORDER BY rental_date"
        ))
        .bind(cutoff)
        .fetch_all(pool)
        .await?;
        tracing::debug!(days_overdue, overdue_count = rentals.len(), "Overdue rentals retrieved");
        Ok(rentals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_lock_is_row_level_on_inventory() {
        assert!(LOCK_INVENTORY_SQL.ends_with("FOR UPDATE OF i"));
        assert!(LOCK_INVENTORY_SQL.contains("LEFT JOIN film"));
        assert!(OPEN_RENTAL_EXISTS_SQL.contains("return_date IS NULL"));
    }

    #[test]
    fn caller_errors_carry_the_offending_id() {
        assert_eq!(
            RentalError::CustomerNotFound(7).to_string(),
            "Customer with ID 7 not found"
        );
        assert_eq!(
            RentalError::InventoryNotFound(12).to_string(),
            "Inventory item 12 not found"
        );
        assert_eq!(
            RentalError::InventoryUnavailable(12).to_string(),
            "Inventory item 12 is currently rented out"
        );
    }
}
