//! HS256 token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use refhub_core::UserId;

use crate::claims::{validate_claims, JwtClaims, TokenKind, TokenValidationError};
use crate::AccountRole;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or tampered token")]
    Malformed,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Access + refresh token pair handed to a client after login/registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Shared-secret (HS256) validator.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Time checks are done by `validate_claims` against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &validation)
            .map_err(|_| TokenError::Malformed)?;

        validate_claims(&data.claims, kind, now)?;
        Ok(data.claims)
    }
}

/// Signs token pairs for identities.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_ref()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_pair(&self, sub: UserId, role: AccountRole, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(sub, role, TokenKind::Access, now)?,
            refresh: self.issue(sub, role, TokenKind::Refresh, now)?,
        })
    }

    pub fn issue_access(&self, sub: UserId, role: AccountRole, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(sub, role, TokenKind::Access, now)
    }

    fn issue(&self, sub: UserId, role: AccountRole, kind: TokenKind, now: DateTime<Utc>) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = JwtClaims {
            sub,
            role,
            kind,
            iat: now,
            exp: now + ttl,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
