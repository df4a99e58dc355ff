//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use kinora_core::AppError;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Operation not supported by backend: {0}")]
    Unsupported(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte stream returned by ranged reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Reader consumed by full-object writes.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Result of a metadata-only lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub size: u64,
    pub content_type: Option<String>,
}

/// Missing objects surface as NotFound; every other backend failure is Internal.
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("object not found: {}", key)),
            StorageError::Unsupported(msg) => AppError::InvalidInput(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Object Store Adapter
///
/// Keys are `{owner_id}/{record_id}/{file_name}`, produced by [`crate::keys::object_key`].
/// Every operation is a round trip to the backend; none retries.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a complete object from `reader`, replacing any existing object at `key`.
    ///
    /// The object becomes visible only once fully written. Returns the number of bytes stored.
    async fn put(
        &self,
        key: &str,
        reader: ObjectReader,
        size: Option<u64>,
        content_type: &str,
    ) -> StorageResult<u64>;

    /// Read the inclusive byte window `[start, end]` of an object.
    ///
    /// The stream may end early if the object is shorter than `end + 1`.
    async fn get_range(&self, key: &str, start: u64, end: u64) -> StorageResult<ByteStream>;

    /// Size and content type of an object, or `NotFound`.
    async fn stat(&self, key: &str) -> StorageResult<ObjectStat>;

    /// Delete an object. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Time-limited GET URL for direct client download.
    async fn presign_download(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Time-limited PUT URL for direct client upload.
    ///
    /// Backends that cannot sign return `Unsupported`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Unsigned URL of an object, as recorded after an upload commit.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinora_core::ErrorKind;

    #[test]
    fn test_storage_error_kinds() {
        let not_found: AppError = StorageError::NotFound("a/b/c".into()).into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let failed: AppError = StorageError::DownloadFailed("reset".into()).into();
        assert_eq!(failed.kind(), ErrorKind::Internal);

        let io: AppError = StorageError::from(std::io::Error::other("disk")).into();
        assert_eq!(io.kind(), ErrorKind::Internal);

        let unsupported: AppError = StorageError::Unsupported("presign".into()).into();
        assert_eq!(unsupported.kind(), ErrorKind::InvalidArgument);
    }
}
