//! Service wiring: picks the store backend and builds the application services.

use std::sync::Arc;

use anyhow::Context;

use refhub_auth::{Hs256JwtValidator, JwtValidator, TokenIssuer};
use refhub_infra::{
    bank::HttpBankVerifier,
    config::AppConfig,
    services::Services,
    store::{PgStore, Stores},
};

/// Everything the router needs at runtime.
#[derive(Clone)]
pub struct AppServices {
    pub services: Arc<Services>,
    pub jwt: Arc<dyn JwtValidator>,
}

/// Postgres when `DATABASE_URL` is set, otherwise the in-memory store.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let stores = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to Postgres")?;
            tracing::info!("using Postgres store");
            Stores::from_backend(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            Stores::in_memory()
        }
    };
    wire(stores, config).await
}

/// Build services over an explicit set of stores and seed the bootstrap admin.
pub async fn wire(stores: Stores, config: &AppConfig) -> anyhow::Result<AppServices> {
    let secret = config.jwt_secret.as_bytes();
    let tokens = TokenIssuer::new(secret, config.access_token_ttl, config.refresh_token_ttl);
    let jwt: Arc<dyn JwtValidator> = Arc::new(Hs256JwtValidator::new(secret));
    let bank = HttpBankVerifier::new(&config.bank).context("failed to build bank lookup client")?;

    let services = Services::new(stores, tokens, jwt.clone(), Arc::new(bank), config.referral_reward);

    if let Some(admin) = &config.bootstrap_admin {
        services
            .staff
            .ensure_superadmin(&admin.email, &admin.password)
            .await
            .context("failed to create bootstrap superadmin")?;
    }

    Ok(AppServices {
        services: Arc::new(services),
        jwt,
    })
}
