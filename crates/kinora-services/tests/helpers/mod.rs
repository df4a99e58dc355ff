//! Test helpers: wire the orchestrator over an in-memory catalog and local storage.
//!
//! Run from workspace root: `cargo test -p kinora-services`.

#![allow(dead_code)]

pub mod storage;

use bytes::Bytes;
use futures::{stream, StreamExt};
use kinora_core::models::{
    CreateMediaRequest, DownloadRequest, MediaResponse, UploadChunk, UploadHeader, UploadOutcome,
};
use kinora_core::AppError;
use kinora_db::InMemoryMediaStore;
use kinora_services::{
    CacheError, CachedCatalog, Download, DownloadStreamer, MediaCache, MediaService,
    UploadAssembler,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use self::storage::CountingStorage;

pub const OWNER: &str = "owner-1";

/// Second cache invalidation is pushed past the end of any test run.
pub const REINVALIDATE_DELAY: Duration = Duration::from_secs(3600);

/// Cache backed by a map, so tests can observe invalidation.
///
/// An armed gate holds the next `set_with_expiry` until the returned sender fires, which
/// lets a test interleave a catalog write between a read miss and its cache fill.
#[derive(Default)]
pub struct MapCache {
    pub entries: Mutex<HashMap<String, String>>,
    set_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MapCache {
    pub async fn hold_next_set(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.set_gate.lock().await = Some(rx);
        tx
    }

    /// True until a `set_with_expiry` call has picked up the armed gate.
    pub async fn set_gate_is_armed(&self) -> bool {
        self.set_gate.lock().await.is_some()
    }
}

#[async_trait::async_trait]
impl MediaCache for MapCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        let gate = self.set_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

pub struct TestHarness {
    pub store: Arc<InMemoryMediaStore>,
    pub storage: Arc<CountingStorage>,
    pub cache: Arc<MapCache>,
    pub catalog: CachedCatalog,
    pub media: MediaService,
    pub uploads: UploadAssembler,
    pub downloads: DownloadStreamer,
    pub _temp_dir: TempDir,
}

pub async fn setup() -> TestHarness {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = Arc::new(CountingStorage::new(temp_dir.path().join("objects")).await);
    let store = Arc::new(InMemoryMediaStore::new());
    let cache = Arc::new(MapCache::default());

    let catalog = CachedCatalog::new(store.clone(), cache.clone(), Duration::from_secs(60))
        .with_reinvalidate_delay(REINVALIDATE_DELAY);
    let media = MediaService::new(catalog.clone(), storage.clone());
    let uploads = UploadAssembler::new(
        catalog.clone(),
        storage.clone(),
        Some(temp_dir.path().to_path_buf()),
    );
    let downloads = DownloadStreamer::new(catalog.clone(), storage.clone());

    TestHarness {
        store,
        storage,
        cache,
        catalog,
        media,
        uploads,
        downloads,
        _temp_dir: temp_dir,
    }
}

impl TestHarness {
    pub async fn create(&self, owner: &str, title: &str) -> MediaResponse {
        self.media
            .create(
                owner,
                CreateMediaRequest {
                    title: title.to_string(),
                    description: String::new(),
                    content_type: None,
                    owner_id: None,
                },
            )
            .await
            .expect("Failed to create media record")
    }

    pub async fn upload(
        &self,
        record_id: Uuid,
        file_name: &str,
        data: &[u8],
    ) -> Result<UploadOutcome, AppError> {
        self.uploads
            .upload(stream::iter(chunks(record_id, file_name, data, 7)))
            .await
    }

    pub async fn download(
        &self,
        record_id: Uuid,
        owner: &str,
        start: i64,
        end: i64,
    ) -> Result<Download, AppError> {
        self.downloads
            .open(DownloadRequest {
                record_id,
                owner_id: owner.to_string(),
                start,
                end,
            })
            .await
    }
}

/// Header followed by `data` split into `chunk_size` pieces.
pub fn chunks(
    record_id: Uuid,
    file_name: &str,
    data: &[u8],
    chunk_size: usize,
) -> Vec<Result<UploadChunk, AppError>> {
    let mut out = vec![Ok(UploadChunk::Header(UploadHeader {
        record_id,
        file_name: file_name.to_string(),
        total_size: Some(data.len() as u64),
    }))];
    out.extend(
        data.chunks(chunk_size)
            .map(|c| Ok(UploadChunk::Data(Bytes::copy_from_slice(c)))),
    );
    out
}

/// Collect every frame of a download body.
pub async fn collect_frames(download: Download) -> Vec<Result<Bytes, AppError>> {
    download.body.collect().await
}

pub async fn collect_bytes(download: Download) -> Vec<u8> {
    collect_frames(download)
        .await
        .into_iter()
        .flat_map(|frame| frame.expect("download frame failed").to_vec())
        .collect()
}
