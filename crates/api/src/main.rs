//! lockgate API server

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lockgate_api::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let pool = lockgate_shared::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to database")?;
    lockgate_shared::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(config, pool);
    let router = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", state.config.bind_address))?;
    tracing::info!(addr = %state.config.bind_address, "lockgate api listening");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
