use bytes::Bytes;
use futures::{Stream, StreamExt};
use kinora_core::models::{MediaRecord, UploadChunk, UploadHeader, UploadOutcome};
use kinora_core::validation::validate_file_name;
use kinora_core::{content_type_for_file_name, AppError};
use kinora_storage::{object_key, Storage};
use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use super::catalog::CachedCatalog;

/// One inbound upload call after its header arrived.
///
/// Owns the staging file; dropping the session on any exit path discards staged bytes.
struct UploadSession {
    header: UploadHeader,
    record: MediaRecord,
    staging: File,
    received: u64,
}

impl UploadSession {
    async fn append(&mut self, data: &Bytes) -> Result<(), AppError> {
        self.staging.write_all(data).await.map_err(|e| {
            AppError::Internal(format!("failed to write upload staging file: {}", e))
        })?;
        self.received += data.len() as u64;
        Ok(())
    }

    /// Seal the staging file and rewind it for transfer to the object store.
    async fn seal(&mut self) -> Result<(), AppError> {
        self.staging
            .flush()
            .await
            .map_err(|e| AppError::Internal(format!("failed to flush upload staging file: {}", e)))?;
        self.staging
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| AppError::Internal(format!("failed to rewind upload staging file: {}", e)))?;
        Ok(())
    }
}

/// Reassembles an ordered chunk stream into one stored object and commits it to the catalog.
///
/// The object key is derived from the file name, so a re-upload under the same name
/// overwrites the live object before the catalog commit. If that commit fails the caller
/// gets an error while readers already see the new bytes; the record itself is unchanged.
#[derive(Clone)]
pub struct UploadAssembler {
    catalog: CachedCatalog,
    storage: Arc<dyn Storage>,
    staging_dir: Option<PathBuf>,
}

impl UploadAssembler {
    pub fn new(
        catalog: CachedCatalog,
        storage: Arc<dyn Storage>,
        staging_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            storage,
            staging_dir,
        }
    }

    /// Consume `chunks` strictly in arrival order.
    ///
    /// The first message must be a header; every later one must be data. Any error,
    /// including one yielded by the inbound stream itself, aborts the session and leaves
    /// the record untouched.
    pub async fn upload<S>(&self, chunks: S) -> Result<UploadOutcome, AppError>
    where
        S: Stream<Item = Result<UploadChunk, AppError>> + Send,
    {
        let mut chunks = std::pin::pin!(chunks);
        let mut session: Option<UploadSession> = None;

        while let Some(chunk) = chunks.next().await {
            match chunk? {
                UploadChunk::Header(header) => {
                    if session.is_some() {
                        return Err(AppError::InvalidInput(
                            "upload header sent more than once".to_string(),
                        ));
                    }
                    session = Some(self.open_session(header).await?);
                }
                UploadChunk::Data(data) => {
                    let active = session.as_mut().ok_or_else(|| {
                        AppError::InvalidInput("upload header must precede file data".to_string())
                    })?;
                    active.append(&data).await?;
                }
            }
        }

        let session = session.ok_or_else(|| {
            AppError::InvalidInput("upload stream ended without a header".to_string())
        })?;

        self.commit(session).await
    }

    #[tracing::instrument(skip(self, header), fields(media_id = %header.record_id, file_name = %header.file_name))]
    async fn open_session(&self, header: UploadHeader) -> Result<UploadSession, AppError> {
        validate_file_name(&header.file_name)?;
        let record = self.catalog.require(header.record_id).await?;

        let staging = match self.staging_dir {
            Some(ref dir) => tempfile::tempfile_in(dir),
            None => tempfile::tempfile(),
        }
        .map_err(|e| AppError::Internal(format!("failed to create upload staging file: {}", e)))?;

        tracing::debug!(declared_size = ?header.total_size, "Upload session opened");

        Ok(UploadSession {
            header,
            record,
            staging: File::from_std(staging),
            received: 0,
        })
    }

    #[tracing::instrument(skip(self, session), fields(media_id = %session.record.id))]
    async fn commit(&self, mut session: UploadSession) -> Result<UploadOutcome, AppError> {
        session.seal().await?;

        if let Some(declared) = session.header.total_size {
            if declared != session.received {
                tracing::warn!(
                    declared_size = declared,
                    received_size = session.received,
                    "Upload size differs from declared total"
                );
            }
        }

        let record = &session.record;
        let key = object_key(&record.owner_id, record.id, &session.header.file_name);
        let content_type = content_type_for_file_name(&session.header.file_name);
        let record_id = record.id;
        let previous_path = record.storage_path.clone();
        let received = session.received;

        let staging = Box::pin(session.staging);
        let written = self
            .storage
            .put(&key, staging, Some(received), content_type)
            .await?;

        let committed = self.catalog.commit_content(record_id, &key, content_type).await;
        match committed {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.discard_object(&key, &previous_path).await;
                return Err(AppError::NotFound("media not found".to_string()));
            }
            Err(e) => {
                self.discard_object(&key, &previous_path).await;
                return Err(e);
            }
        }

        if !previous_path.is_empty() && previous_path != key {
            if let Err(e) = self.storage.delete(&previous_path).await {
                tracing::warn!(
                    error = %e,
                    storage_path = %previous_path,
                    "Failed to delete replaced object"
                );
            }
        }

        tracing::info!(
            storage_path = %key,
            content_type = %content_type,
            size_bytes = written,
            "Upload committed"
        );

        Ok(UploadOutcome {
            record_id,
            url: self.storage.public_url(&key),
            storage_path: key,
            size: written,
        })
    }

    /// Remove an object whose catalog commit failed.
    ///
    /// An object at the record's current path is kept: the record still references it.
    async fn discard_object(&self, key: &str, current_path: &str) {
        if key == current_path {
            return;
        }
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(error = %e, storage_path = %key, "Failed to discard uncommitted object");
        }
    }
}
