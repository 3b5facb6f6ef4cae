use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse access level carried in the token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        };
        write!(f, "{s}")
    }
}

/// Customer attributes copied into the token at issuance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSnapshot {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub store_id: i32,
    pub role: Role,
}

/// Claims embedded in the JWT access token.
///
/// `expires` is absolute epoch seconds. There is no registered `exp` claim;
/// the codec checks this field itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub session_id: Uuid,
    pub customer_id: i32,
    pub role: Role,
    pub customer: CustomerSnapshot,
    pub expires: i64,
}

/// Extracted from a validated token — available via Axum extractors
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthenticatedCustomer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub store_id: i32,
    pub role: Role,
}

impl From<CustomerSnapshot> for AuthenticatedCustomer {
    fn from(s: CustomerSnapshot) -> Self {
        Self {
            customer_id: s.customer_id,
            first_name: s.first_name,
            last_name: s.last_name,
            email: s.email,
            is_active: s.is_active,
            store_id: s.store_id,
            role: s.role,
        }
    }
}

/// Same identity, but only constructed once the admin gate has passed.
#[derive(Debug, Clone)]
pub struct AdminCustomer(pub AuthenticatedCustomer);

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub user_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
}
