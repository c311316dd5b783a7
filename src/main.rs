use anyhow::Context;
use std::time::Duration;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::EnvFilter;

use property_manager::config::AppConfig;
use property_manager::{app, bootstrap};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, PORT, etc. can live there
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();
    let default_level = if config.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
    tracing::info!("Starting Property Manager in {:?} mode", config.environment);

    let bind_addr = config.bind_addr();
    let (state, report) = bootstrap(config).await.context("database initialization failed")?;
    if let Some(email) = &report.seeded_admin {
        tracing::info!("Seeded administrator account {}", email);
    }

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.delete_expired().await {
                tracing::error!("Failed to delete expired sessions: {}", e);
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Property Manager listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
