use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use refhub_accounts::RegistrationForm;
use refhub_auth::AccountRole;
use refhub_infra::services::{LoginRequest, Services};

use crate::app::{dto, errors};

/// `POST /register/individual` and `POST /register/company`.
pub async fn register(
    Extension(services): Extension<Arc<Services>>,
    Path(role): Path<String>,
    body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Response {
    let role = match role.as_str() {
        "individual" => AccountRole::Individual,
        "company" => AccountRole::Company,
        _ => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    };
    let form = match dto::body(body) {
        Ok(form) => form,
        Err(resp) => return resp,
    };

    match services.accounts.register(role, form).await {
        Ok(registered) => (
            StatusCode::CREATED,
            Json(dto::RegisterResponse {
                user: (&registered.account).into(),
                access: &registered.tokens.access,
                refresh: &registered.tokens.refresh,
            }),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<Services>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let request = match dto::body(body) {
        Ok(request) => request,
        Err(resp) => return resp,
    };

    match services.accounts.login(request).await {
        Ok(outcome) => Json(dto::LoginResponse {
            access: &outcome.tokens.access,
            refresh: &outcome.tokens.refresh,
            user_id: outcome.account.id(),
            email: outcome.account.identity().email.as_str(),
            role: outcome.account.role(),
            profile: outcome.account.login_profile(),
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<Services>>,
    body: Result<Json<dto::RefreshRequest>, JsonRejection>,
) -> Response {
    let request = match dto::body(body) {
        Ok(request) => request,
        Err(resp) => return resp,
    };

    match services.accounts.refresh(&request.refresh).await {
        Ok(access) => Json(serde_json::json!({ "access": access })).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
