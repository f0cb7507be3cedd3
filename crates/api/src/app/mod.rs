//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and extraction helpers
//! - `errors.rs`: consistent error responses

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use refhub_infra::config::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let app = services::build_services(config).await?;
    Ok(router(app))
}

/// Router over already wired services.
pub fn router(app: services::AppServices) -> Router {
    let auth_state = middleware::AuthState { jwt: app.jwt };

    // Authentication is optional at this layer; services decide what needs a caller.
    let api = routes::router()
        .layer(Extension(app.services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
