//! Storage setup and initialization

use anyhow::{Context, Result};
use kinora_core::StorageConfig;
use kinora_services::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    tracing::info!(backend = ?config.backend, "Initializing object storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        bucket = ?config.s3_bucket,
        endpoint = ?config.s3_endpoint,
        "Object storage initialized successfully"
    );
    Ok(storage)
}
