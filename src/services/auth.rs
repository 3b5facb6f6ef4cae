use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    models::{
        auth::{AdminCustomer, AuthenticatedCustomer, Role},
        customer::Customer,
    },
    services::token::{TokenCodec, TokenError},
};

/// Lookup of the authoritative customer record by id.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn find_customer(&self, customer_id: i32) -> anyhow::Result<Option<Customer>>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("customer {0} not found")]
    AccountNotFound(i32),
    #[error("customer {0} is not an admin")]
    RoleInsufficient(i32),
    #[error("credential store failure: {0}")]
    Store(anyhow::Error),
}

impl AuthError {
    /// True for every outcome that is reported to the caller as
    /// "Invalid credentials"; false for infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AuthError::Store(_))
    }
}

/// Token issuance and request authentication.
///
/// Every call is independent: the token is decoded, then the account is
/// re-read from the store to make sure it still exists. Nothing is cached.
#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CustomerStore>,
}

impl AuthService {
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn CustomerStore>) -> Self {
        Self { codec, store }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issue a token for `customer_id`. The id alone is trusted; there is no
    /// password step.
    pub async fn issue_for(&self, customer_id: i32) -> Result<String, AuthError> {
        let customer = self.load(customer_id).await?;
        self.codec.issue(&customer).map_err(AuthError::Store)
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedCustomer, AuthError> {
        let claims = self.codec.decode(token).inspect_err(|e| {
            tracing::debug!(reason = %e, "Rejected access token");
        })?;

        self.load(claims.customer_id).await?;

        // Identity reflects the token's snapshot, not the fresh record.
        Ok(claims.customer.into())
    }

    pub async fn authenticate_admin(&self, token: &str) -> Result<AdminCustomer, AuthError> {
        let user = self.authenticate(token).await?;
        if user.role != Role::Admin {
            tracing::info!(customer_id = user.customer_id, role = %user.role, "Admin access denied");
            return Err(AuthError::RoleInsufficient(user.customer_id));
        }
        Ok(AdminCustomer(user))
    }

    async fn load(&self, customer_id: i32) -> Result<Customer, AuthError> {
        self.store
            .find_customer(customer_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or_else(|| {
                tracing::info!(customer_id, "Customer not found for authentication");
                AuthError::AccountNotFound(customer_id)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use chrono::NaiveDate;

    use super::*;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<i32, Customer>>);

    impl MemoryStore {
        fn insert(&self, customer: Customer) {
            self.0.lock().unwrap().insert(customer.customer_id, customer);
        }

        fn remove(&self, id: i32) {
            self.0.lock().unwrap().remove(&id);
        }
    }

    #[async_trait]
    impl CustomerStore for MemoryStore {
        async fn find_customer(&self, customer_id: i32) -> anyhow::Result<Option<Customer>> {
            Ok(self.0.lock().unwrap().get(&customer_id).cloned())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CustomerStore for BrokenStore {
        async fn find_customer(&self, _customer_id: i32) -> anyhow::Result<Option<Customer>> {
            anyhow::bail!("connection refused")
        }
    }

    fn customer(id: i32, first_name: &str) -> Customer {
        Customer {
            customer_id: id,
            store_id: 1,
            first_name: first_name.into(),
            last_name: "TESTER".into(),
            email: Some(format!("{}@example.org", first_name.to_lowercase())),
            address_id: 1,
            activebool: true,
            create_date: NaiveDate::from_ymd_opt(2006, 2, 14).unwrap(),
            last_update: None,
        }
    }

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        store.insert(customer(5, "ADA"));
        store.insert(customer(150, "BOB"));
        let codec = Arc::new(TokenCodec::new("gate-secret", 600));
        (AuthService::new(codec, store.clone()), store)
    }

    #[tokio::test]
    async fn authenticate_returns_identity_from_token() {
        let (auth, _) = service();
        let token = auth.issue_for(5).await.unwrap();
        let user = auth.authenticate(&token).await.unwrap();

        assert_eq!(user.customer_id, 5);
        assert_eq!(user.first_name, "ADA");
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn issue_for_unknown_customer_is_rejected() {
        let (auth, _) = service();
        let err = auth.issue_for(9999).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound(9999)));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn admin_gate_rejects_regular_customer() {
        let (auth, _) = service();
        let token = auth.issue_for(150).await.unwrap();

        assert!(auth.authenticate(&token).await.is_ok());
        let err = auth.authenticate_admin(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleInsufficient(150)));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn admin_gate_accepts_admin() {
        let (auth, _) = service();
        let token = auth.issue_for(5).await.unwrap();
        let AdminCustomer(admin) = auth.authenticate_admin(&token).await.unwrap();
        assert_eq!(admin.customer_id, 5);
    }

    #[tokio::test]
    async fn deleted_account_is_rejected() {
        let (auth, store) = service();
        let token = auth.issue_for(150).await.unwrap();
        store.remove(150);

        let err = auth.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountNotFound(150)));
    }

    #[tokio::test]
    async fn identity_reflects_issuance_time_snapshot() {
        let (auth, store) = service();
        let token = auth.issue_for(150).await.unwrap();
        store.insert(customer(150, "ROBERT"));

        let user = auth.authenticate(&token).await.unwrap();
        assert_eq!(user.first_name, "BOB");
    }

    #[tokio::test]
    async fn token_failures_are_rejections() {
        let (auth, _) = service();
        let err = auth.authenticate("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Invalid(_))));
        assert!(err.is_rejection());

        let expired = auth
            .codec()
            .issue_at(&customer(5, "ADA"), chrono::Utc::now().timestamp() - 601)
            .unwrap();
        let err = auth.authenticate(&expired).await.unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::Expired)));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn store_failure_is_not_a_rejection() {
        let codec = Arc::new(TokenCodec::new("gate-secret", 600));
        let token = codec.issue(&customer(5, "ADA")).unwrap();
        let auth = AuthService::new(codec, Arc::new(BrokenStore));

        let err = auth.authenticate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
        assert!(!err.is_rejection());
    }
}
