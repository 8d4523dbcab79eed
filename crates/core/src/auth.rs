//! Shared-password admin gate.
//!
//! There are no accounts: anyone holding the site password is an admin.
//! A successful login is turned into a signed, expiring session token that
//! the API stores in an HTTP-only cookie.

use std::time::Duration;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SESSION_SUBJECT: &str = "admin";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid password hash: {0}")]
    InvalidHash(String),
    #[error("session token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Verifies the shared password against an argon2 PHC string.
#[derive(Clone)]
pub struct PasswordGate {
    hash: String,
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate").finish_non_exhaustive()
    }
}

impl PasswordGate {
    pub fn new(hash: impl Into<String>) -> Result<Self, AuthError> {
        let hash = hash.into();
        PasswordHash::new(&hash).map_err(|e| AuthError::InvalidHash(e.to_string()))?;
        Ok(Self { hash })
    }

    pub fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Produce a PHC string for `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::InvalidHash(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and checks session tokens (HS256).
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: SESSION_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl.as_secs() as i64,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("tier1").unwrap();
        let gate = PasswordGate::new(hash).unwrap();
        assert!(gate.verify("tier1"));
        assert!(!gate.verify("tier2"));
    }

    #[test]
    fn rejects_non_phc_hash() {
        assert!(matches!(
            PasswordGate::new("plaintext"),
            Err(AuthError::InvalidHash(_))
        ));
    }

    #[test]
    fn session_tokens_verify_and_expire() {
        let keys = SessionKeys::new(b"secret", Duration::from_secs(3600));
        let token = keys.issue(Utc::now()).unwrap();
        assert_eq!(keys.verify(&token).unwrap().sub, "admin");

        let stale = keys.issue(Utc::now() - chrono::Duration::hours(3)).unwrap();
        assert!(keys.verify(&stale).is_err());

        let foreign = SessionKeys::new(b"other", Duration::from_secs(3600));
        assert!(foreign.verify(&token).is_err());
    }
}
