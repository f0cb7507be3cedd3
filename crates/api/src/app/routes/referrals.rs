use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::{IntoResponse, Response},
    Json,
};

use refhub_infra::services::Services;

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub async fn list_referrals(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.referrals.list(PrincipalContext::caller(principal)).await {
        Ok(referrals) => Json(referrals).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn wallet(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.referrals.wallet(PrincipalContext::caller(principal)).await {
        Ok(wallet) => Json(wallet).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Proxies the upstream bank lookup body unchanged.
pub async fn verify_account(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    query: Result<Query<dto::VerifyAccountQuery>, QueryRejection>,
) -> Response {
    let query = match dto::query(query) {
        Ok(query) => query,
        Err(resp) => return resp,
    };
    match services
        .bank
        .verify(PrincipalContext::caller(principal), query.account_number, query.bank_code)
        .await
    {
        Ok(body) => Json(body).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
