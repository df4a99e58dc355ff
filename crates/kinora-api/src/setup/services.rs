//! Service and cache initialization

use anyhow::Result;
use kinora_core::{CacheConfig, Config};
use kinora_db::{MediaStore, PgMediaStore};
use kinora_services::{
    CachedCatalog, DownloadStreamer, MediaCache, MediaService, NoOpCache, Storage,
    UploadAssembler,
};
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Build the metadata cache. Without `REDIS_URL` lookups go straight to the catalog.
pub async fn setup_cache(config: &CacheConfig) -> Result<Arc<dyn MediaCache>> {
    let Some(ref url) = config.redis_url else {
        tracing::info!("REDIS_URL not set, metadata cache disabled");
        return Ok(Arc::new(NoOpCache));
    };

    #[cfg(feature = "redis-cache")]
    {
        let cache = kinora_services::RedisCache::new(url)
            .map_err(|e| anyhow::anyhow!("Failed to create Redis cache: {}", e))?;
        // An unreachable cache degrades to catalog reads; it does not block startup.
        match cache.ping().await {
            Ok(()) => tracing::info!(ttl_secs = config.ttl_secs, "Redis metadata cache enabled"),
            Err(e) => tracing::warn!(error = %e, "Redis ping failed, cache reads will fall back"),
        }
        Ok(Arc::new(cache))
    }

    #[cfg(not(feature = "redis-cache"))]
    {
        tracing::warn!(
            redis_url = %url,
            "REDIS_URL set but the redis-cache feature is disabled, metadata cache disabled"
        );
        Ok(Arc::new(NoOpCache))
    }
}

/// Wire the orchestrator over the Postgres catalog.
pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
    cache: Arc<dyn MediaCache>,
) -> Arc<AppState> {
    let store: Arc<dyn MediaStore> = Arc::new(PgMediaStore::new(pool.clone()));
    build_state(
        store,
        storage,
        cache,
        Duration::from_secs(config.cache.ttl_secs),
        config.upload_staging_dir.clone(),
        Some(pool),
    )
}

/// Wire the orchestrator over any catalog implementation.
pub fn build_state(
    store: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    cache: Arc<dyn MediaCache>,
    cache_ttl: Duration,
    staging_dir: Option<PathBuf>,
    pool: Option<PgPool>,
) -> Arc<AppState> {
    let catalog = CachedCatalog::new(store, cache, cache_ttl);

    Arc::new(AppState {
        media: MediaService::new(catalog.clone(), storage.clone()),
        uploads: UploadAssembler::new(catalog.clone(), storage.clone(), staging_dir),
        downloads: DownloadStreamer::new(catalog, storage.clone()),
        storage,
        pool,
    })
}
