use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::Config,
    models::{auth::Claims, customer::Customer},
    services::session,
};

/// Why a token was refused. Only ever logged; callers collapse every variant
/// into the same "Invalid credentials" response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("unexpected error decoding token: {0}")]
    Decode(String),
}

/// Signs and verifies access tokens with a single HS256 secret.
///
/// Built once at startup from [`Config`] and shared read-only between
/// requests; issuing and decoding take `&self` and never block.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        // Expiry lives in `Claims::expires` and is checked in `decode_at`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_ttl_seconds)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn issue(&self, customer: &Customer) -> anyhow::Result<String> {
        self.issue_at(customer, Utc::now().timestamp())
    }

    /// Build and sign a fresh claim set for `customer`, issued at `now`
    /// (epoch seconds).
    pub fn issue_at(&self, customer: &Customer, now: i64) -> anyhow::Result<String> {
        tracing::info!(customer_id = customer.customer_id, "Signing access token");

        let (role, snapshot) = session::derive(customer);
        let claims = Claims {
            session_id: Uuid::new_v4(),
            customer_id: customer.customer_id,
            role,
            customer: snapshot,
            expires: now + self.ttl_seconds,
        };

        let token = encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Verify `token` and check its embedded expiry against `now`.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(classify)?
            .claims;

        if now >= claims.expires {
            tracing::debug!(customer_id = claims.customer_id, "Access token expired");
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => {
            tracing::warn!(error = %err, "Invalid access token");
            TokenError::Invalid(err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "Unexpected error decoding access token");
            TokenError::Decode(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::auth::Role;

    fn customer(id: i32) -> Customer {
        Customer {
            customer_id: id,
            store_id: 1,
            first_name: "MARY".into(),
            last_name: "SMITH".into(),
            email: Some("mary.smith@sakilacustomer.org".into()),
            address_id: 5,
            activebool: true,
            create_date: NaiveDate::from_ymd_opt(2006, 2, 14).unwrap(),
            last_update: None,
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", 600)
    }

    #[test]
    fn issue_then_decode_returns_the_same_claims() {
        let codec = codec();
        let c = customer(130);
        let token = codec.issue(&c).unwrap();
        let claims = codec.decode(&token).unwrap();

        assert_eq!(claims.customer_id, 130);
        assert_eq!(claims.role, Role::Customer);
        assert_eq!(claims.customer, session::derive(&c).1);
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let codec = codec();
        let token = codec.issue_at(&customer(1), 1_000_000).unwrap();
        let claims = codec.decode_at(&token, 1_000_000).unwrap();
        assert_eq!(claims.expires, 1_000_000 + codec.ttl_seconds());
        assert_eq!(codec.ttl_seconds(), 600);
    }

    #[test]
    fn decode_after_ttl_is_expired() {
        let codec = codec();
        let token = codec.issue_at(&customer(300), 1_000_000).unwrap();

        assert!(codec.decode_at(&token, 1_000_599).is_ok());
        assert_eq!(codec.decode_at(&token, 1_000_600).unwrap_err(), TokenError::Expired);
        assert_eq!(codec.decode_at(&token, 1_000_601).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let codec = codec();
        let token = codec.issue(&customer(42)).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(codec.decode(&tampered), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn token_signed_with_another_secret_is_invalid() {
        let token = TokenCodec::new("other-secret", 600).issue(&customer(42)).unwrap();
        assert!(matches!(codec().decode(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(codec().decode("not-a-token"), Err(TokenError::Invalid(_))));
        assert!(matches!(codec().decode(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn admin_token_expires_when_clock_passes_ttl() {
        let codec = codec();
        let issued_at = Utc::now().timestamp();
        let token = codec.issue_at(&customer(5), issued_at).unwrap();

        let claims = codec.decode_at(&token, issued_at + 1).unwrap();
        assert_eq!(claims.role, Role::Admin);

        assert_eq!(
            codec.decode_at(&token, issued_at + 601).unwrap_err(),
            TokenError::Expired
        );
    }

    #[tokio::test]
    async fn concurrent_issuance_yields_distinct_sessions() {
        let codec = Arc::new(codec());
        let c = customer(7);

        let a = tokio::spawn({
            let codec = codec.clone();
            let c = c.clone();
            async move { codec.issue(&c).unwrap() }
        });
        let b = tokio::spawn({
            let codec = codec.clone();
            async move { codec.issue(&c).unwrap() }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        let ca = codec.decode(&a).unwrap();
        let cb = codec.decode(&b).unwrap();
        assert_ne!(ca.session_id, cb.session_id);
        assert_eq!(ca.customer_id, cb.customer_id);
    }
}
