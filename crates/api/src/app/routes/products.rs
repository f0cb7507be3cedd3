use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use refhub_core::ProductId;
use refhub_infra::{error::ServiceError, services::Services};
use refhub_referrals::{Product, ProductForm};

use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
}

fn product_response(status: StatusCode, result: Result<Product, ServiceError>) -> Response {
    match result {
        Ok(product) => (status, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Public; no token needed.
pub async fn list_products(Extension(services): Extension<Arc<Services>>) -> Response {
    match services.products.list().await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<Services>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    product_response(StatusCode::OK, services.products.get(id).await)
}

pub async fn create_product(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> Response {
    let form = match dto::body(body) {
        Ok(form) => form,
        Err(resp) => return resp,
    };
    product_response(
        StatusCode::CREATED,
        services.products.create(PrincipalContext::caller(principal), form).await,
    )
}

pub async fn replace_product(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> Response {
    let (id, form) = match parse(&id, body) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    product_response(
        StatusCode::OK,
        services.products.replace(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn patch_product(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> Response {
    let (id, form) = match parse(&id, body) {
        Ok(parsed) => parsed,
        Err(resp) => return resp,
    };
    product_response(
        StatusCode::OK,
        services.products.patch(PrincipalContext::caller(principal), id, form).await,
    )
}

pub async fn delete_product(
    Extension(services): Extension<Arc<Services>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.products.delete(PrincipalContext::caller(principal), id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse(id: &str, body: Result<Json<ProductForm>, JsonRejection>) -> Result<(ProductId, ProductForm), Response> {
    Ok((dto::parse_id(id, "product")?, dto::body(body)?))
}
