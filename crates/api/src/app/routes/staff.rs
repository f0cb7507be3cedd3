use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use refhub_accounts::{NewStaffForm, StaffUpdate};
use refhub_core::UserId;
use refhub_infra::services::Services;

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/:id", get(get_staff).patch(update_staff).delete(deactivate_staff))
}

pub async fn list_staff(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.staff.list(PrincipalContext::caller(principal)).await {
        Ok(staff) => Json(dto::users(&staff)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_staff(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<NewStaffForm>, JsonRejection>,
) -> Response {
    let form = match dto::body(body) {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    match services.staff.create(PrincipalContext::caller(principal), form).await {
        Ok(account) => (StatusCode::CREATED, Json(dto::UserView::from(&account))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_staff(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match dto::parse_id(&id, "staff") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.staff.get(PrincipalContext::caller(principal), id).await {
        Ok(account) => Json(dto::UserView::from(&account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_staff(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<StaffUpdate>, JsonRejection>,
) -> Response {
    let id: UserId = match dto::parse_id(&id, "staff") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let update = match dto::body(body) {
        Ok(update) => update,
        Err(resp) => return resp,
    };
    match services.staff.update(PrincipalContext::caller(principal), id, update).await {
        Ok(account) => Json(dto::UserView::from(&account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Soft delete; the account stays and is marked inactive.
pub async fn deactivate_staff(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id: UserId = match dto::parse_id(&id, "staff") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.staff.deactivate(PrincipalContext::caller(principal), id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
