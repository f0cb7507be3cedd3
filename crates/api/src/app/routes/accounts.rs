use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use refhub_accounts::{Account, ProfileUpdate};
use refhub_auth::AccountRole;
use refhub_core::UserId;
use refhub_infra::{error::ServiceError, services::Services};

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_accounts))
        .route("/me", get(me).patch(update_me))
        .route("/me/password", post(change_password))
        .route("/:id", get(get_account))
        .route("/:id/approve", post(approve))
        .route("/:id/decline", post(decline))
        .route("/:id/activate", post(activate))
        .route("/:id/deactivate", post(deactivate))
}

fn account_response(result: Result<Account, ServiceError>) -> Response {
    match result {
        Ok(account) => Json(dto::UserView::from(&account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn accounts_response(result: Result<Vec<Account>, ServiceError>) -> Response {
    match result {
        Ok(accounts) => Json(dto::users(&accounts)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_accounts(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    query: Result<Query<dto::AccountListQuery>, QueryRejection>,
) -> Response {
    let role = match dto::query(query).and_then(|q| dto::parse_role(q.role.as_deref())) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    accounts_response(services.accounts.list(PrincipalContext::caller(principal), role).await)
}

pub async fn list_individuals(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    let caller = PrincipalContext::caller(principal);
    accounts_response(services.accounts.list(caller, Some(AccountRole::Individual)).await)
}

pub async fn list_companies(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    let caller = PrincipalContext::caller(principal);
    accounts_response(services.accounts.list(caller, Some(AccountRole::Company)).await)
}

pub async fn me(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    account_response(services.accounts.me(PrincipalContext::caller(principal)).await)
}

pub async fn update_me(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Response {
    let update = match dto::body(body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    account_response(
        services
            .accounts
            .update_me(PrincipalContext::caller(principal), update)
            .await,
    )
}

pub async fn change_password(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<dto::ChangePasswordRequest>, JsonRejection>,
) -> Response {
    let request = match dto::body(body) {
        Ok(request) => request,
        Err(resp) => return resp,
    };
    match services
        .accounts
        .change_password(
            PrincipalContext::caller(principal),
            &request.current_password,
            &request.new_password,
        )
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match dto::parse_id(&id, "account") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    account_response(services.accounts.get(PrincipalContext::caller(principal), id).await)
}

macro_rules! lifecycle_handler {
    ($name:ident) => {
        pub async fn $name(
            Extension(services): Extension<Arc<Services>>,
            principal: Option<Extension<PrincipalContext>>,
            Path(id): Path<String>,
        ) -> Response {
            let id: UserId = match dto::parse_id(&id, "account") {
                Ok(id) => id,
                Err(resp) => return resp,
            };
            account_response(services.accounts.$name(PrincipalContext::caller(principal), id).await)
        }
    };
}

lifecycle_handler!(approve);
lifecycle_handler!(decline);
lifecycle_handler!(activate);
lifecycle_handler!(deactivate);
