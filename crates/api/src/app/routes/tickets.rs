use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use refhub_core::TicketId;
use refhub_infra::{error::ServiceError, services::Services};
use refhub_referrals::{SupportTicket, TicketForm};

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_tickets).post(create_ticket))
        .route(
            "/:id",
            get(get_ticket)
                .put(replace_ticket)
                .patch(patch_ticket)
                .delete(delete_ticket),
        )
        .route("/:id/resolve", post(resolve_ticket))
}

fn ticket_response(status: StatusCode, result: Result<SupportTicket, ServiceError>) -> Response {
    match result {
        Ok(ticket) => (status, Json(ticket)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn ticket_id(raw: &str) -> Result<TicketId, Response> {
    dto::parse_id(raw, "support ticket")
}

pub async fn list_tickets(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.tickets.list(PrincipalContext::caller(principal)).await {
        Ok(tickets) => Json(tickets).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match ticket_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    ticket_response(
        StatusCode::OK,
        services.tickets.get(PrincipalContext::caller(principal), id).await,
    )
}

/// Any `submitted_by` in the payload is ignored; the caller is the submitter.
pub async fn create_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<TicketForm>, JsonRejection>,
) -> Response {
    let form = match dto::body(body) {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    ticket_response(
        StatusCode::CREATED,
        services.tickets.create(PrincipalContext::caller(principal), form).await,
    )
}

pub async fn replace_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<TicketForm>, JsonRejection>,
) -> Response {
    let (id, form) = match ticket_id(&id).and_then(|id| Ok((id, dto::body(body)?))) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    ticket_response(
        StatusCode::OK,
        services.tickets.replace(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn patch_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<TicketForm>, JsonRejection>,
) -> Response {
    let (id, form) = match ticket_id(&id).and_then(|id| Ok((id, dto::body(body)?))) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    ticket_response(
        StatusCode::OK,
        services.tickets.patch(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn resolve_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match ticket_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    ticket_response(
        StatusCode::OK,
        services.tickets.resolve(PrincipalContext::caller(principal), id).await,
    )
}

pub async fn delete_ticket(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match ticket_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.tickets.delete(PrincipalContext::caller(principal), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
