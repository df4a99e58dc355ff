//! Application state shared by every handler.

use kinora_services::{DownloadStreamer, MediaService, Storage, UploadAssembler};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub media: MediaService,
    pub uploads: UploadAssembler,
    pub downloads: DownloadStreamer,
    pub storage: Arc<dyn Storage>,
    /// Catalog pool for health probes; absent when the catalog is not Postgres-backed.
    pub pool: Option<PgPool>,
}
