//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the holder's permissions and a unique
//! `jti`. There is no revocation list: an issued token stays valid until
//! its expiry, and the `jti` exists for audit correlation, not recall.
//! Keep TTLs short accordingly.

use crate::generate_secret;
use chrono::{Duration, Utc};
use custode_core::Permission;
use custode_error::{CustodeResult, KeyError, KeyErrorKind};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Holder's user id, as a string per JWT convention
    pub sub: String,
    /// Unique token id
    pub jti: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Permissions granted to the holder
    pub permissions: Vec<Permission>,
}

impl Claims {
    /// The holder's user id, when `sub` is well-formed.
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

/// Issues and verifies signed bearer tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a service signing with the given secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::default();
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Create a service with a random per-process signing secret. Tokens
    /// do not survive a restart.
    pub fn with_random_secret() -> Self {
        Self::new(generate_secret())
    }

    /// Issue a token for `user_id` carrying `permissions`, valid for
    /// `ttl`.
    pub fn issue_token(
        &self,
        user_id: u64,
        permissions: &HashSet<Permission>,
        ttl: Duration,
    ) -> CustodeResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            permissions: permissions.iter().copied().collect(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| KeyError::new(KeyErrorKind::Token(e.to_string())))?;
        debug!(user_id, jti = %claims.jti, "Token issued");
        Ok(token)
    }

    /// Verify a token's signature and expiry and return its claims.
    pub fn verify_token(&self, token: &str) -> CustodeResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => {
                    KeyError::new(KeyErrorKind::Expired("bearer token".to_string()))
                }
                _ => KeyError::new(KeyErrorKind::Invalid(e.to_string())),
            }
        })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custode_error::CustodeErrorKind;

    fn key_error(err: custode_error::CustodeError) -> KeyErrorKind {
        match err.kind() {
            CustodeErrorKind::Key(e) => e.kind().clone(),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let service = TokenService::with_random_secret();
        let permissions: HashSet<Permission> = [Permission::TicketManage].into_iter().collect();

        let token = service
            .issue_token(42, &permissions, Duration::minutes(5))
            .unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.user_id(), Some(42));
        assert!(claims.permissions.contains(&Permission::TicketManage));
        assert!(claims.exp > claims.iat);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::with_random_secret();
        let token = service
            .issue_token(42, &HashSet::new(), Duration::seconds(-10))
            .unwrap();
        assert!(matches!(
            key_error(service.verify_token(&token).unwrap_err()),
            KeyErrorKind::Expired(_)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = TokenService::with_random_secret();
        let token = service
            .issue_token(42, &HashSet::new(), Duration::minutes(5))
            .unwrap();
        let tampered = format!("{}x", token);
        assert!(matches!(
            key_error(service.verify_token(&tampered).unwrap_err()),
            KeyErrorKind::Invalid(_)
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issuer = TokenService::with_random_secret();
        let verifier = TokenService::with_random_secret();
        let token = issuer
            .issue_token(42, &HashSet::new(), Duration::minutes(5))
            .unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_jti_is_unique_per_token() {
        let service = TokenService::with_random_secret();
        let first = service
            .issue_token(42, &HashSet::new(), Duration::minutes(5))
            .unwrap();
        let second = service
            .issue_token(42, &HashSet::new(), Duration::minutes(5))
            .unwrap();
        assert_ne!(
            service.verify_token(&first).unwrap().jti,
            service.verify_token(&second).unwrap().jti
        );
    }
}
