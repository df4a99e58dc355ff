use async_trait::async_trait;
use kinora_storage::{
    ByteStream, LocalStorage, ObjectReader, ObjectStat, Storage, StorageBackend, StorageResult,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Local storage that counts calls, to assert which paths touch the store.
pub struct CountingStorage {
    inner: LocalStorage,
    pub reads: AtomicUsize,
    pub stats: AtomicUsize,
    pub puts: AtomicUsize,
}

impl CountingStorage {
    pub async fn new(base_path: PathBuf) -> Self {
        let inner = LocalStorage::new(base_path, "http://localhost:3000/media".to_string())
            .await
            .expect("Failed to create local storage");
        Self {
            inner,
            reads: AtomicUsize::new(0),
            stats: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn store_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.stats.load(Ordering::SeqCst)
            + self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn put(
        &self,
        key: &str,
        reader: ObjectReader,
        size: Option<u64>,
        content_type: &str,
    ) -> StorageResult<u64> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, reader, size, content_type).await
    }

    async fn get_range(&self, key: &str, start: u64, end: u64) -> StorageResult<ByteStream> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_range(key, start, end).await
    }

    async fn stat(&self, key: &str) -> StorageResult<ObjectStat> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.inner.stat(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn presign_download(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.inner.presign_download(key, expires_in).await
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.inner.presign_upload(key, content_type, expires_in).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
