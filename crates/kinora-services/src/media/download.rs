use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use kinora_core::constants::DOWNLOAD_FRAME_SIZE;
use kinora_core::models::{ByteRange, DownloadRequest, MediaRecord};
use kinora_core::AppError;
use kinora_storage::{ByteStream, Storage, StorageError};
use std::sync::Arc;

use super::catalog::CachedCatalog;

/// An opened download: the resolved window plus its outbound frames.
pub struct Download {
    pub range: ByteRange,
    /// Total size of the stored object
    pub object_size: u64,
    pub content_type: String,
    /// At most `range.content_length()` bytes, in frames of at most 64 KiB.
    pub body: BoxStream<'static, Result<Bytes, AppError>>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("range", &self.range)
            .field("object_size", &self.object_size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Serves bounded byte windows of stored objects.
#[derive(Clone)]
pub struct DownloadStreamer {
    catalog: CachedCatalog,
    storage: Arc<dyn Storage>,
    frame_size: usize,
}

impl DownloadStreamer {
    pub fn new(catalog: CachedCatalog, storage: Arc<dyn Storage>) -> Self {
        Self {
            catalog,
            storage,
            frame_size: DOWNLOAD_FRAME_SIZE,
        }
    }

    /// Resolve, authorize and open a ranged read.
    ///
    /// Ownership is checked right after the catalog lookup, before any object-store call.
    /// Nothing is read from the store until the returned body is polled past the range open.
    #[tracing::instrument(skip(self, request), fields(media_id = %request.record_id))]
    pub async fn open(&self, request: DownloadRequest) -> Result<Download, AppError> {
        let record = self.catalog.require(request.record_id).await?;
        authorize(&record, &request.owner_id)?;

        let (record, stat) = match self.storage.stat(&record.storage_path).await {
            Ok(stat) => (record, stat),
            Err(StorageError::NotFound(key)) => {
                // A cached record can outlive its object after a re-upload.
                let fresh = self.catalog.refresh(request.record_id).await?;
                if fresh.storage_path == record.storage_path {
                    return Err(StorageError::NotFound(key).into());
                }
                authorize(&fresh, &request.owner_id)?;
                let stat = self.storage.stat(&fresh.storage_path).await?;
                (fresh, stat)
            }
            Err(e) => return Err(e.into()),
        };

        let range = ByteRange::resolve(request.start, request.end, stat.size)?;

        let source = self
            .storage
            .get_range(&record.storage_path, range.start, range.end)
            .await?;

        tracing::debug!(
            start = range.start,
            end = range.end,
            content_length = range.content_length(),
            object_size = stat.size,
            "Download opened"
        );

        Ok(Download {
            range,
            object_size: stat.size,
            content_type: stat.content_type.unwrap_or(record.content_type),
            body: frame_stream(source, range.content_length(), self.frame_size),
        })
    }
}

fn authorize(record: &MediaRecord, owner_id: &str) -> Result<(), AppError> {
    if !record.is_owned_by(owner_id) {
        tracing::warn!(owner_id = %owner_id, "Download denied: owner mismatch");
        return Err(AppError::PermissionDenied("permission denied".to_string()));
    }
    if !record.has_content() {
        return Err(AppError::NotFound("media has no content".to_string()));
    }
    Ok(())
}

/// Running state of one outbound download.
struct DownloadSession {
    /// Dropped as soon as the session finishes, errs, or is abandoned.
    source: Option<ByteStream>,
    pending: Bytes,
    remaining: u64,
}

/// Re-chunk `source` into frames of at most `frame_size` bytes, stopping after
/// `content_length` bytes or when the source ends, whichever comes first.
///
/// A source error is yielded once and ends the stream.
fn frame_stream(
    source: ByteStream,
    content_length: u64,
    frame_size: usize,
) -> BoxStream<'static, Result<Bytes, AppError>> {
    let session = DownloadSession {
        source: Some(source),
        pending: Bytes::new(),
        remaining: content_length,
    };

    stream::unfold(session, move |mut session| async move {
        loop {
            if session.remaining == 0 {
                return None;
            }

            if !session.pending.is_empty() {
                let cap = usize::try_from(session.remaining).unwrap_or(usize::MAX);
                let n = session.pending.len().min(frame_size).min(cap);
                let frame = session.pending.split_to(n);
                session.remaining -= n as u64;
                return Some((Ok(frame), session));
            }

            let source = session.source.as_mut()?;
            match source.next().await {
                Some(Ok(bytes)) => session.pending = bytes,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Download source failed mid-stream");
                    session.source = None;
                    session.remaining = 0;
                    return Some((Err(AppError::from(e)), session));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
