use kinora_core::constants::CACHE_REINVALIDATE_DELAY;
use kinora_core::models::{MediaRecord, MediaStatus};
use kinora_core::AppError;
use kinora_db::MediaStore;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::MediaCache;

fn cache_key(id: Uuid) -> String {
    format!("media:{}", id)
}

/// Catalog access shared by the orchestrator components.
///
/// Reads go through the cache; every write invalidates the record's cache entry after
/// the catalog write, whether or not it succeeded, and once more after
/// `reinvalidate_delay` to evict entries filled by reads that raced the write.
///
/// Only ready records are cached. A cached entry can still be stale for up to the
/// reinvalidation delay; callers that find its object missing use [`CachedCatalog::refresh`].
#[derive(Clone)]
pub struct CachedCatalog {
    store: Arc<dyn MediaStore>,
    cache: Arc<dyn MediaCache>,
    ttl: Duration,
    reinvalidate_delay: Duration,
}

impl CachedCatalog {
    pub fn new(store: Arc<dyn MediaStore>, cache: Arc<dyn MediaCache>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            reinvalidate_delay: CACHE_REINVALIDATE_DELAY,
        }
    }

    pub fn with_reinvalidate_delay(mut self, delay: Duration) -> Self {
        self.reinvalidate_delay = delay;
        self
    }

    pub async fn create(&self, record: &MediaRecord) -> Result<MediaRecord, AppError> {
        self.store.create(record).await
    }

    /// Read-through lookup. Cache failures fall back to the catalog.
    pub async fn get(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let key = cache_key(id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<MediaRecord>(&raw) {
                Ok(record) => {
                    tracing::debug!(media_id = %id, "Media cache hit");
                    return Ok(Some(record));
                }
                Err(e) => tracing::warn!(error = %e, media_id = %id, "Discarding bad cache entry"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, media_id = %id, "Media cache read failed"),
        }

        let record = self.store.get_by_id(id).await?;
        if let Some(ref record) = record {
            self.fill(record).await;
        }
        Ok(record)
    }

    /// Re-read a record from the catalog, replacing whatever the cache holds for it.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn refresh(&self, id: Uuid) -> Result<MediaRecord, AppError> {
        let key = cache_key(id);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(error = %e, media_id = %id, "Media cache invalidation failed");
        }

        let record = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))?;
        self.fill(&record).await;
        Ok(record)
    }

    /// Pending records are about to change on commit and are never cached.
    async fn fill(&self, record: &MediaRecord) {
        if record.status != MediaStatus::Ready {
            return;
        }
        match serde_json::to_string(record) {
            Ok(raw) => {
                if let Err(e) = self
                    .cache
                    .set_with_expiry(&cache_key(record.id), &raw, self.ttl)
                    .await
                {
                    tracing::warn!(error = %e, media_id = %record.id, "Media cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, media_id = %record.id, "Media cache encode failed"),
        }
    }

    /// Get a record or fail with NotFound.
    pub async fn require(&self, id: Uuid) -> Result<MediaRecord, AppError> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))
    }

    pub async fn update_details(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<MediaRecord>, AppError> {
        let result = self.store.update_details(id, title, description).await;
        self.invalidate(id).await;
        result
    }

    pub async fn commit_content(
        &self,
        id: Uuid,
        storage_path: &str,
        content_type: &str,
    ) -> Result<Option<MediaRecord>, AppError> {
        let result = self.store.commit_content(id, storage_path, content_type).await;
        self.invalidate(id).await;
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let result = self.store.delete(id).await;
        self.invalidate(id).await;
        result
    }

    pub async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<MediaRecord>, AppError> {
        self.store.list_by_owner(owner_id, limit).await
    }

    async fn invalidate(&self, id: Uuid) {
        let key = cache_key(id);
        if let Err(e) = self.cache.delete(&key).await {
            tracing::warn!(error = %e, media_id = %id, "Media cache invalidation failed");
        }

        let cache = self.cache.clone();
        let delay = self.reinvalidate_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = cache.delete(&key).await {
                tracing::warn!(error = %e, media_id = %id, "Delayed media cache invalidation failed");
            }
        });
    }
}
