//! `refhub-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{authorize, ticket_visibility, AuthzError, TicketVisibility};
pub use claims::{validate_claims, JwtClaims, TokenKind, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError};
pub use permissions::{Action, Resource};
pub use principal::{AccountStatus, Principal};
pub use roles::{AccountRole, StaffTier};
pub use token::{Hs256JwtValidator, JwtValidator, TokenError, TokenIssuer, TokenPair};
