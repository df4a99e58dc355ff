//! Application setup and initialization
//!
//! Wiring lives here rather than in main.rs so tests can build the same router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use kinora_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format)
        .context("Failed to initialize telemetry")?;

    // Fail fast on misconfiguration, before touching any collaborator
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = ?config.storage.backend,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config.database).await?;
    let storage = storage::setup_storage(&config.storage).await?;
    let cache = services::setup_cache(&config.cache).await?;

    let state = services::initialize_services(&config, pool, storage, cache);

    let router = routes::setup_routes(state.clone());
    routes::report::log_route_report();

    Ok((state, router))
}
