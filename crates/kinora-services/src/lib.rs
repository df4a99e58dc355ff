//! Kinora Services Layer
//!
//! Transfer Orchestrator: record CRUD with derived access URLs ([`MediaService`]),
//! chunked upload assembly ([`UploadAssembler`]) and ranged download streaming
//! ([`DownloadStreamer`]). Keep coordination between the catalog and the object
//! store here; keep thin HTTP handling in kinora-api.

pub mod cache;
pub mod media;

#[cfg(feature = "redis-cache")]
pub use cache::RedisCache;
pub use cache::{CacheError, MediaCache, NoOpCache};
pub use media::{
    CachedCatalog, Download, DownloadStreamer, MediaService, PresignedUrl, UploadAssembler,
};
pub use kinora_storage::{create_storage, Storage, StorageBackend, StorageError};
