use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    models::customer::{Customer, CUSTOMER_COLUMNS},
    services::auth::CustomerStore,
};

pub struct CustomerService;

impl CustomerService {
    pub async fn get(pool: &PgPool, customer_id: i32) -> anyhow::Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
        Ok(customer)
    }
}

/// Postgres-backed credential store used by the auth gate.
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn find_customer(&self, customer_id: i32) -> anyhow::Result<Option<Customer>> {
        CustomerService::get(&self.pool, customer_id).await
    }
}
