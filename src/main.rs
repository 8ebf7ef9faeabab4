use anyhow::Context;
use tracing_subscriber::EnvFilter;

use games_api::config::AppConfig;
use games_api::database::Stores;
use games_api::services::ensure_bootstrap_user;
use games_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SECRET_KEY, MONGO_DETAILS, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("games_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting Games API in {:?} mode ({:?} store)",
        config.environment,
        config.database.backend
    );

    let stores = Stores::from_config(&config.database)
        .await
        .context("failed to initialise store")?;
    let state = AppState::new(config, stores);

    if let Some(bootstrap) = &state.config.bootstrap {
        ensure_bootstrap_user(state.users.as_ref(), bootstrap, state.config.security.bcrypt_cost)
            .await
            .context("failed to create bootstrap user")?;
    }

    let bind_addr = state.config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Games API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
