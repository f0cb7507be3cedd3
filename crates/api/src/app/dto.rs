use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::Query,
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use refhub_accounts::{Account, Identity, Profile};
use refhub_auth::AccountRole;
use refhub_core::UserId;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountListQuery {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyAccountQuery {
    pub account_number: Option<String>,
    pub bank_code: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// Flat JSON view of an account: identity fields plus the tagged profile.
#[derive(Debug, Serialize)]
pub struct UserView<'a> {
    #[serde(flatten)]
    pub identity: &'a Identity,
    pub profile: &'a Profile,
}

impl<'a> From<&'a Account> for UserView<'a> {
    fn from(account: &'a Account) -> Self {
        Self {
            identity: account.identity(),
            profile: account.profile(),
        }
    }
}

pub fn users(accounts: &[Account]) -> Vec<UserView<'_>> {
    accounts.iter().map(UserView::from).collect()
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse<'a> {
    pub user: UserView<'a>,
    pub access: &'a str,
    pub refresh: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse<'a> {
    pub access: &'a str,
    pub refresh: &'a str,
    pub user_id: UserId,
    pub email: &'a str,
    pub role: AccountRole,
    /// `null` for admins.
    pub profile: Option<&'a Profile>,
}

// -------------------------
// Extraction helpers
// -------------------------

/// Unwrap a JSON body, answering malformed input with the standard error shape.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(v)| v)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

pub fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, Response> {
    query
        .map(|Query(v)| v)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()))
}

/// Parse a path id (`UserId`, `ProductId`, ...).
pub fn parse_id<T: core::str::FromStr>(raw: &str, what: &'static str) -> Result<T, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

pub fn parse_role(raw: Option<&str>) -> Result<Option<AccountRole>, Response> {
    raw.map(|r| r.parse::<AccountRole>())
        .transpose()
        .map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_role",
                "role must be one of: individual, company, admin",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use refhub_core::ProductId;

    #[test]
    fn role_filter_parses_known_roles() {
        assert!(matches!(parse_role(None), Ok(None)));
        assert!(matches!(parse_role(Some("company")), Ok(Some(AccountRole::Company))));
        assert_eq!(parse_role(Some("wizard")).unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_path_ids_are_bad_requests() {
        let err = parse_id::<ProductId>("42", "product").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(parse_id::<ProductId>(&ProductId::new().to_string(), "product").is_ok());
    }
}
