use anyhow::Context;

use refhub_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before tracing so RUST_LOG from the file applies.
    let _ = dotenvy::dotenv();
    refhub_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = refhub_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
