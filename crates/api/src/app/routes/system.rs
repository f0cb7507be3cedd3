use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use refhub_infra::services::Services;

use crate::app::errors;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Identity the server sees for this token, resolved against the store.
pub async fn whoami(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.accounts.me(PrincipalContext::caller(principal)).await {
        Ok(account) => Json(serde_json::json!({
            "user_id": account.id(),
            "email": account.identity().email,
            "role": account.role(),
            "status": account.identity().status,
            "staff_tier": account.profile().staff_tier(),
        }))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
