use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use refhub_core::UserId;

use crate::AccountRole;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims model (transport-agnostic).
///
/// `role` is copied from the stored identity at issuance time; it is never
/// taken from client input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / identity identifier.
    pub sub: UserId,

    /// Role of the identity when the token was issued.
    pub role: AccountRole,

    pub kind: TokenKind,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// happens in [`crate::token`].
pub fn validate_claims(
    claims: &JwtClaims,
    expected: TokenKind,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.kind != expected {
        return Err(TokenValidationError::WrongKind { expected });
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(kind: TokenKind, iat: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: UserId::new(),
            role: AccountRole::Company,
            kind,
            iat,
            exp: iat + ttl,
        }
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        let c = claims(TokenKind::Access, now, Duration::minutes(15));
        assert_eq!(validate_claims(&c, TokenKind::Access, now + Duration::minutes(1)), Ok(()));
    }

    #[test]
    fn rejects_expired_and_future_tokens() {
        let now = Utc::now();
        let c = claims(TokenKind::Access, now, Duration::minutes(15));
        assert_eq!(
            validate_claims(&c, TokenKind::Access, now + Duration::minutes(15)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&c, TokenKind::Access, now - Duration::seconds(5)),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_refresh_token_used_as_access() {
        let now = Utc::now();
        let c = claims(TokenKind::Refresh, now, Duration::days(7));
        assert_eq!(
            validate_claims(&c, TokenKind::Access, now),
            Err(TokenValidationError::WrongKind { expected: TokenKind::Access })
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let c = claims(TokenKind::Access, now, Duration::zero());
        assert_eq!(
            validate_claims(&c, TokenKind::Access, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
