use crate::keys::encode_key_for_url;
use crate::traits::{ByteStream, ObjectReader, ObjectStat, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use kinora_core::content_type_for_file_name;
use std::io::{ErrorKind as IoErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Local filesystem storage implementation
///
/// Used for development and tests. Presigned uploads are not supported; presigned
/// downloads return the unsigned public URL.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/kinora/media")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:50051/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Map a key to a path under `base_path`, rejecting anything that could escape it.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!("{:?}", key)));
        }
        if key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(StorageError::InvalidKey(format!("{:?}", key)));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn map_open_error(key: &str, path: &Path, err: std::io::Error) -> StorageError {
        if err.kind() == IoErrorKind::NotFound {
            StorageError::NotFound(key.to_string())
        } else {
            StorageError::DownloadFailed(format!("Failed to open {}: {}", path.display(), err))
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        mut reader: ObjectReader,
        _size: Option<u64>,
        _content_type: &str,
    ) -> StorageResult<u64> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Write beside the target and rename so readers never see a partial object.
        let partial = path.with_file_name(format!(
            ".{}.partial-{}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Uuid::new_v4()
        ));

        let written = async {
            let mut file = fs::File::create(&partial).await?;
            let written = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(written)
        }
        .await;

        let written = match written {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage put failed"
                );
                return Err(StorageError::UploadFailed(format!(
                    "Failed to write {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to publish {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(written)
    }

    async fn get_range(&self, key: &str, start: u64, end: u64) -> StorageResult<ByteStream> {
        if end < start {
            return Err(StorageError::DownloadFailed(format!(
                "empty range {}-{}",
                start, end
            )));
        }
        let path = self.key_to_path(key)?;

        let mut file = fs::File::open(&path)
            .await
            .map_err(|e| Self::map_open_error(key, &path, e))?;
        file.seek(SeekFrom::Start(start)).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to seek {}: {}", path.display(), e))
        })?;

        let window = file.take(end - start + 1);
        let key = key.to_string();
        let stream = ReaderStream::new(window).map(move |result| {
            result.map_err(|e| {
                tracing::error!(error = %e, key = %key, "Local storage range read error");
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn stat(&self, key: &str) -> StorageResult<ObjectStat> {
        let path = self.key_to_path(key)?;
        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::BackendError(e.to_string())
            }
        })?;
        if !meta.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        Ok(ObjectStat {
            size: meta.len(),
            content_type: Some(content_type_for_file_name(key).to_string()),
        })
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn presign_download(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        self.key_to_path(key)?;
        Ok(self.public_url(key))
    }

    async fn presign_upload(
        &self,
        _key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::Unsupported(
            "presigned uploads are not available on local storage".to_string(),
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            encode_key_for_url(key)
        )
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:50051/media".to_string())
            .await
            .unwrap()
    }

    fn reader(data: &[u8]) -> ObjectReader {
        Box::pin(std::io::Cursor::new(data.to_vec()))
    }

    async fn collect(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<_> = stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_put_then_stat_and_read() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let data = b"0123456789".to_vec();

        let written = storage
            .put("owner/rec/clip.mp4", reader(&data), Some(10), "video/mp4")
            .await
            .unwrap();
        assert_eq!(written, 10);

        let stat = storage.stat("owner/rec/clip.mp4").await.unwrap();
        assert_eq!(stat.size, 10);
        assert_eq!(stat.content_type.as_deref(), Some("video/mp4"));

        let stream = storage.get_range("owner/rec/clip.mp4", 0, 9).await.unwrap();
        assert_eq!(collect(stream).await, data);
    }

    #[tokio::test]
    async fn test_get_range_window() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        storage
            .put("o/r/f.bin", reader(b"abcdefghij"), None, "application/octet-stream")
            .await
            .unwrap();

        let stream = storage.get_range("o/r/f.bin", 2, 5).await.unwrap();
        assert_eq!(collect(stream).await, b"cdef");

        // Past-the-end windows end early instead of failing.
        let stream = storage.get_range("o/r/f.bin", 8, 100).await.unwrap();
        assert_eq!(collect(stream).await, b"ij");
    }

    #[tokio::test]
    async fn test_put_replaces_existing_object() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        storage.put("o/r/f.txt", reader(b"first version"), None, "text/plain").await.unwrap();
        storage.put("o/r/f.txt", reader(b"second"), None, "text/plain").await.unwrap();

        assert_eq!(storage.stat("o/r/f.txt").await.unwrap().size, 6);
        let stream = storage.get_range("o/r/f.txt", 0, 5).await.unwrap();
        assert_eq!(collect(stream).await, b"second");

        // No partial files left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("o/r")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(matches!(
            storage.stat("o/r/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            storage.get_range("o/r/missing.mp4", 0, 10).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!storage.exists("o/r/missing.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert!(matches!(
            storage.stat("../../../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.delete("o/../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.exists("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        storage.put("o/r/f.txt", reader(b"x"), None, "text/plain").await.unwrap();

        storage.delete("o/r/f.txt").await.unwrap();
        assert!(!storage.exists("o/r/f.txt").await.unwrap());
        storage.delete("o/r/f.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_urls() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        assert_eq!(
            storage.public_url("o/r/my clip.mp4"),
            "http://localhost:50051/media/o/r/my%20clip.mp4"
        );
        assert_eq!(
            storage
                .presign_download("o/r/a.mp4", Duration::from_secs(60))
                .await
                .unwrap(),
            "http://localhost:50051/media/o/r/a.mp4"
        );
        assert!(matches!(
            storage
                .presign_upload("o/r/a.mp4", "video/mp4", Duration::from_secs(60))
                .await,
            Err(StorageError::Unsupported(_))
        ));
    }
}
