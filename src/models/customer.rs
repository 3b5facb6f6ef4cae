use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// DB row struct. Integer columns are fetched as INT4 so the row maps onto i32
/// regardless of the smallint/integer choice in a given Pagila dump.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: i32,
    pub store_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub address_id: i32,
    pub activebool: bool,
    pub create_date: NaiveDate,
    pub last_update: Option<DateTime<Utc>>,
}

/// Column list shared by every customer query.
pub const CUSTOMER_COLUMNS: &str = "customer_id::INT4 AS customer_id, store_id::INT4 AS store_id,
    first_name, last_name, email, address_id::INT4 AS address_id, activebool,
    create_date, last_update";

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub customer_id: i32,
    pub store_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub create_date: NaiveDate,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        Self {
            customer_id: c.customer_id,
            store_id: c.store_id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            is_active: c.activebool,
            create_date: c.create_date,
        }
    }
}
