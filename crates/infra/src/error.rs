//! Infrastructure and application-service errors.

use thiserror::Error;

use refhub_auth::{AuthzError, PasswordError, TokenError};
use refhub_core::DomainError;

/// Persistence failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    /// Anything else the backend reported (connection loss, bad row, poisoned lock).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failure of a call to a third-party service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{service} unavailable: {message}")]
pub struct ExternalServiceError {
    pub service: &'static str,
    pub message: String,
    /// Whether repeating the same request later may succeed.
    pub retryable: bool,
    /// The upstream did not answer within the configured timeout.
    pub timeout: bool,
}

/// Outcome of an application-service call that did not succeed.
///
/// Flattens domain, authorization, persistence and upstream failures into one
/// enum so the HTTP layer has a single mapping point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    External(#[from] ExternalServiceError),

    /// Broken invariant or infrastructure failure; never the caller's fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::MissingFields(fields) => ServiceError::MissingFields(fields),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::Internal(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Forbidden(msg) => ServiceError::Forbidden(msg),
            DomainError::InvalidCredentials => ServiceError::InvalidCredentials,
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Unauthenticated => ServiceError::Unauthenticated,
            AuthzError::Forbidden(msg) => ServiceError::Forbidden(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing(msg) => ServiceError::Internal(msg),
            _ => ServiceError::Unauthenticated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_flatten() {
        assert_eq!(
            ServiceError::from(DomainError::missing_fields(["gender"])),
            ServiceError::MissingFields(vec!["gender".to_string()])
        );
        assert_eq!(
            ServiceError::from(DomainError::conflict("email already registered")),
            ServiceError::Conflict("email already registered".to_string())
        );
        assert!(matches!(
            ServiceError::from(DomainError::invariant("x")),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn store_backend_is_internal() {
        assert_eq!(
            ServiceError::from(StoreError::Backend("pool closed".to_string())),
            ServiceError::Internal("pool closed".to_string())
        );
        assert_eq!(ServiceError::from(StoreError::NotFound), ServiceError::NotFound);
    }

    #[test]
    fn authz_errors_flatten() {
        assert_eq!(ServiceError::from(AuthzError::Unauthenticated), ServiceError::Unauthenticated);
        assert!(matches!(
            ServiceError::from(AuthzError::Forbidden("no".to_string())),
            ServiceError::Forbidden(_)
        ));
    }
}
