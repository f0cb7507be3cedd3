use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use refhub_core::RankingId;
use refhub_infra::{error::ServiceError, services::Services};
use refhub_referrals::{RankingForm, UserRanking};

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_rankings).post(create_ranking))
        .route(
            "/:id",
            get(get_ranking)
                .put(replace_ranking)
                .patch(patch_ranking)
                .delete(delete_ranking),
        )
}

fn ranking_response(status: StatusCode, result: Result<UserRanking, ServiceError>) -> Response {
    match result {
        Ok(ranking) => (status, Json(ranking)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn ranking_id(raw: &str) -> Result<RankingId, Response> {
    dto::parse_id(raw, "user ranking")
}

pub async fn list_rankings(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    match services.rankings.list(PrincipalContext::caller(principal)).await {
        Ok(rankings) => Json(rankings).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_ranking(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match ranking_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    ranking_response(
        StatusCode::OK,
        services.rankings.get(PrincipalContext::caller(principal), id).await,
    )
}

pub async fn create_ranking(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<RankingForm>, JsonRejection>,
) -> Response {
    let form = match dto::body(body) {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    ranking_response(
        StatusCode::CREATED,
        services.rankings.create(PrincipalContext::caller(principal), form).await,
    )
}

pub async fn replace_ranking(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<RankingForm>, JsonRejection>,
) -> Response {
    let (id, form) = match ranking_id(&id).and_then(|id| Ok((id, dto::body(body)?))) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    ranking_response(
        StatusCode::OK,
        services.rankings.replace(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn patch_ranking(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<RankingForm>, JsonRejection>,
) -> Response {
    let (id, form) = match ranking_id(&id).and_then(|id| Ok((id, dto::body(body)?))) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    ranking_response(
        StatusCode::OK,
        services.rankings.patch(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn delete_ranking(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id = match ranking_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.rankings.delete(PrincipalContext::caller(principal), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
