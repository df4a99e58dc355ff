use chrono::{DateTime, Utc};
use kinora_core::constants::{ACCESS_URL_TTL, DIRECT_TRANSFER_URL_TTL};
use kinora_core::models::{
    CreateMediaRequest, MediaRecord, MediaResponse, UpdateMediaRequest, UploadOutcome,
};
use kinora_core::validation::{validate_file_name, validate_owner_id};
use kinora_core::{content_type_for_file_name, AppError};
use kinora_storage::{object_key, Storage, StorageError};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::catalog::CachedCatalog;

/// A time-limited URL for direct client access to the object store.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PresignedUrl {
    pub url: String,
    pub storage_path: String,
    pub expires_at: DateTime<Utc>,
}

/// Record CRUD, access URL derivation and direct-transfer URLs.
#[derive(Clone)]
pub struct MediaService {
    catalog: CachedCatalog,
    storage: Arc<dyn Storage>,
}

impl MediaService {
    pub fn new(catalog: CachedCatalog, storage: Arc<dyn Storage>) -> Self {
        Self { catalog, storage }
    }

    /// Create a pending record. `owner_id` must already be resolved by the caller.
    #[tracing::instrument(skip(self, request))]
    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateMediaRequest,
    ) -> Result<MediaResponse, AppError> {
        request.validate()?;
        validate_owner_id(owner_id)?;

        let record = MediaRecord::new_pending(
            owner_id,
            request.title,
            request.description,
            request.content_type,
        );
        let created = self.catalog.create(&record).await?;

        tracing::info!(media_id = %created.id, owner_id = %created.owner_id, "Media record created");

        Ok(MediaResponse::from_record(created, None, None))
    }

    /// Fetch a record with a freshly computed access URL.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<MediaResponse, AppError> {
        let mut record = self.catalog.require(id).await?;

        if !record.has_content() {
            return Ok(MediaResponse::from_record(record, None, None));
        }

        let mut size = self.object_size(&record).await?;
        if size.is_none() {
            // A cached record can outlive its object after a re-upload.
            let fresh = self.catalog.refresh(id).await?;
            if fresh.storage_path != record.storage_path {
                record = fresh;
                if !record.has_content() {
                    return Ok(MediaResponse::from_record(record, None, None));
                }
                size = self.object_size(&record).await?;
            }
        }
        if size.is_none() {
            tracing::warn!(
                media_id = %id,
                storage_path = %record.storage_path,
                "Ready record references a missing object"
            );
        }

        let url = self
            .storage
            .presign_download(&record.storage_path, ACCESS_URL_TTL)
            .await?;

        Ok(MediaResponse::from_record(record, Some(url), size))
    }

    async fn object_size(&self, record: &MediaRecord) -> Result<Option<u64>, AppError> {
        match self.storage.stat(&record.storage_path).await {
            Ok(stat) => Ok(Some(stat.size)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self, request), fields(media_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateMediaRequest,
    ) -> Result<MediaResponse, AppError> {
        request.validate()?;

        let updated = self
            .catalog
            .update_details(id, request.title.as_deref(), request.description.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))?;

        Ok(MediaResponse::from_record(updated, None, None))
    }

    /// Delete a record, then its stored object. A failed object delete is only logged.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self
            .catalog
            .delete(id)
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))?;

        if !deleted.storage_path.is_empty() {
            if let Err(e) = self.storage.delete(&deleted.storage_path).await {
                tracing::warn!(
                    error = %e,
                    media_id = %id,
                    storage_path = %deleted.storage_path,
                    "Failed to delete stored object for removed record"
                );
            }
        }

        tracing::info!(media_id = %id, "Media record deleted");
        Ok(())
    }

    /// Newest-first listing. `limit` is expected to be clamped already.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, owner_id: &str, limit: i64) -> Result<Vec<MediaResponse>, AppError> {
        validate_owner_id(owner_id)?;
        let records = self.catalog.list_by_owner(owner_id, limit).await?;
        Ok(records
            .into_iter()
            .map(|record| MediaResponse::from_record(record, None, None))
            .collect())
    }

    /// Presigned GET for a ready record, restricted to its owner.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn download_url(&self, id: Uuid, owner_id: &str) -> Result<PresignedUrl, AppError> {
        let record = self.catalog.require(id).await?;
        if !record.is_owned_by(owner_id) {
            return Err(AppError::PermissionDenied("permission denied".to_string()));
        }
        if !record.has_content() {
            return Err(AppError::NotFound("media has no content".to_string()));
        }

        let url = self
            .storage
            .presign_download(&record.storage_path, DIRECT_TRANSFER_URL_TTL)
            .await?;

        Ok(PresignedUrl {
            url,
            storage_path: record.storage_path,
            expires_at: expires_at(DIRECT_TRANSFER_URL_TTL),
        })
    }

    /// Presigned PUT for a direct upload of `file_name`, restricted to the owner.
    ///
    /// The record stays pending until [`MediaService::complete_direct_upload`] runs.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn upload_url(
        &self,
        id: Uuid,
        owner_id: &str,
        file_name: &str,
    ) -> Result<PresignedUrl, AppError> {
        validate_file_name(file_name)?;
        let record = self.catalog.require(id).await?;
        if !record.is_owned_by(owner_id) {
            return Err(AppError::PermissionDenied("permission denied".to_string()));
        }

        let key = object_key(&record.owner_id, record.id, file_name);
        let url = self
            .storage
            .presign_upload(&key, content_type_for_file_name(file_name), DIRECT_TRANSFER_URL_TTL)
            .await?;

        Ok(PresignedUrl {
            url,
            storage_path: key,
            expires_at: expires_at(DIRECT_TRANSFER_URL_TTL),
        })
    }

    /// Commit an object a client uploaded through a presigned PUT.
    ///
    /// Fails with NotFound when nothing was uploaded at the expected key.
    #[tracing::instrument(skip(self), fields(media_id = %id))]
    pub async fn complete_direct_upload(
        &self,
        id: Uuid,
        owner_id: &str,
        file_name: &str,
    ) -> Result<UploadOutcome, AppError> {
        validate_file_name(file_name)?;
        let record = self.catalog.require(id).await?;
        if !record.is_owned_by(owner_id) {
            return Err(AppError::PermissionDenied("permission denied".to_string()));
        }

        let key = object_key(&record.owner_id, record.id, file_name);
        let stat = self.storage.stat(&key).await?;
        let content_type = content_type_for_file_name(file_name);

        self.catalog
            .commit_content(id, &key, content_type)
            .await?
            .ok_or_else(|| AppError::NotFound("media not found".to_string()))?;

        if !record.storage_path.is_empty() && record.storage_path != key {
            if let Err(e) = self.storage.delete(&record.storage_path).await {
                tracing::warn!(error = %e, media_id = %id, "Failed to delete replaced object");
            }
        }

        Ok(UploadOutcome {
            record_id: id,
            url: self.storage.public_url(&key),
            storage_path: key,
            size: stat.size,
        })
    }
}

fn expires_at(ttl: std::time::Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(1))
}
