use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub rental_id: i32,
    pub rental_date: DateTime<Utc>,
    pub inventory_id: i32,
    pub customer_id: i32,
    pub return_date: Option<DateTime<Utc>>,
    pub staff_id: i32,
    pub last_update: DateTime<Utc>,
}

pub const RENTAL_COLUMNS: &str = "rental_id::INT4 AS rental_id, rental_date,
    inventory_id::INT4 AS inventory_id, customer_id::INT4 AS customer_id, return_date,
    staff_id::INT4 AS staff_id, last_update";

#[derive(Debug, Deserialize)]
pub struct CreateRentalRequest {
    pub inventory_id: i32,
    pub staff_id: i32,
}

impl CreateRentalRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.inventory_id <= 0 {
            return Err("inventory_id must be > 0".into());
        }
        if self.staff_id <= 0 {
            return Err("staff_id must be > 0".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RentalCreateResponse {
    pub rental_id: i32,
    pub customer_id: i32,
    pub inventory_id: i32,
    pub film_title: String,
    pub rental_date: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerRentalsQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct OverdueQuery {
    #[serde(default = "default_days_overdue")]
    pub days: i64,
}

impl OverdueQuery {
    pub const MAX_DAYS: i64 = 36_500;
}

fn default_days_overdue() -> i64 {
    7
}
