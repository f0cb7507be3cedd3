use axum::{
    routing::{get, post},
    Router,
};

pub mod accounts;
pub mod auth;
pub mod products;
pub mod rankings;
pub mod referrals;
pub mod staff;
pub mod system;
pub mod tickets;

/// Router for every endpoint behind the auth middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/register/:role", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        .route("/individuals", get(accounts::list_individuals))
        .route("/companies", get(accounts::list_companies))
        .route("/referrals", get(referrals::list_referrals))
        .route("/wallet", get(referrals::wallet))
        .route("/verify-account", get(referrals::verify_account))
        .nest("/accounts", accounts::router())
        .nest("/staff", staff::router())
        .nest("/products", products::router())
        .nest("/support-tickets", tickets::router())
        .nest("/user-rankings", rankings::router())
}
