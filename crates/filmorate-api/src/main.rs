//! Filmorate API server entry point.

use std::error::Error;
use std::sync::Arc;

use filmorate_api::config::{AppConfig, StorageBackend};
use filmorate_api::error::AppError;
use filmorate_api::state::AppState;
use filmorate_api::{app, telemetry};
use filmorate_core::clock::SystemClock;
use filmorate_store::memory::MemoryBackend;
use filmorate_store::postgres::{self, PgBackend};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    tracing::info!("Starting Filmorate API server");

    let state = build_state(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(AppError::Server)?;
    tracing::info!("Listening on {}", config.addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    tracing::info!("Server stopped");
    telemetry.shutdown();
    Ok(())
}

async fn build_state(config: &AppConfig) -> Result<AppState, AppError> {
    let clock = Arc::new(SystemClock);
    match &config.storage {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage");
            Ok(AppState::in_memory(MemoryBackend::open(), clock))
        }
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            postgres::migrate(&pool).await?;
            tracing::info!(max_connections, "Connected to PostgreSQL, migrations applied");
            Ok(AppState::postgres(PgBackend::new(pool), clock))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
