use crate::models::{
    auth::{CustomerSnapshot, Role},
    customer::Customer,
};

/// Customers with an id below this value are treated as administrators.
pub const ADMIN_ID_THRESHOLD: i32 = 100;

/// Role assignment policy. Nothing else in the crate compares ids to decide
/// a role.
pub fn role_for(customer_id: i32) -> Role {
    if customer_id < ADMIN_ID_THRESHOLD {
        Role::Admin
    } else {
        Role::Customer
    }
}

/// Snapshot the attributes that travel inside a token, taken at issuance.
pub fn derive(customer: &Customer) -> (Role, CustomerSnapshot) {
    let role = role_for(customer.customer_id);
    let snapshot = CustomerSnapshot {
        customer_id: customer.customer_id,
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        email: customer.email.clone(),
        is_active: customer.activebool,
        store_id: customer.store_id,
        role,
    };
    (role, snapshot)
}
