//! Streaming upload and ranged download.

use crate::error::{ErrorResponse, HttpAppError};
use crate::extract::{resolve_owner, OwnerHeader};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use futures::{stream, StreamExt};
use kinora_core::models::{DownloadRequest, UploadChunk, UploadHeader, UploadOutcome};
use kinora_core::AppError;
use kinora_services::Download;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadContentQuery {
    /// Name the object is stored under; its extension selects the content type
    pub file_name: String,
    /// Declared total size in bytes; defaults to `Content-Length`
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadContentQuery {
    /// Caller identity; falls back to the `X-Owner-Id` header
    #[serde(default)]
    pub owner_id: Option<String>,
    /// First byte offset, inclusive (default 0)
    #[serde(default)]
    pub start: Option<i64>,
    /// Last byte offset, inclusive; negative means the end of the object (default -1)
    #[serde(default)]
    pub end: Option<i64>,
}

#[utoipa::path(
    put,
    path = "/api/v0/media/{id}/content",
    tag = "transfer",
    params(
        ("id" = Uuid, Path, description = "Media ID"),
        UploadContentQuery
    ),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Upload committed", body = UploadOutcome),
        (status = 400, description = "Invalid file name", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Storage or catalog failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query, headers, body), fields(media_id = %id, operation = "upload_content"))]
pub async fn upload_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    query: Result<Query<UploadContentQuery>, QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadOutcome>, HttpAppError> {
    let Query(query) = query?;

    let header = UploadChunk::Header(UploadHeader {
        record_id: id,
        file_name: query.file_name,
        total_size: query.total_size.or_else(|| content_length(&headers)),
    });

    let data = body.into_data_stream().map(|frame| {
        frame
            .map(UploadChunk::Data)
            .map_err(|e| AppError::Internal(format!("failed to read request body: {}", e)))
    });
    let chunks = stream::once(async move { Ok(header) }).chain(data);

    let outcome = state.uploads.upload(chunks).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/content",
    tag = "transfer",
    params(
        ("id" = Uuid, Path, description = "Media ID"),
        ("Range" = Option<String>, Header, description = "bytes=start-end or bytes=start-"),
        DownloadContentQuery
    ),
    responses(
        (status = 200, description = "Requested window of the object", content_type = "application/octet-stream"),
        (status = 206, description = "Window selected by the Range header", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid range", body = ErrorResponse),
        (status = 403, description = "Caller does not own the record", body = ErrorResponse),
        (status = 404, description = "Media not found or has no content", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, owner_header, query, headers), fields(media_id = %id, operation = "download_content"))]
pub async fn download_content(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    owner_header: OwnerHeader,
    query: Result<Query<DownloadContentQuery>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let Query(query) = query?;
    let owner_id = resolve_owner(query.owner_id, owner_header)?;

    let range_header = parse_range_header(&headers)?;
    let (start, end) = range_header.unwrap_or((query.start.unwrap_or(0), query.end.unwrap_or(-1)));

    let Download {
        range,
        object_size,
        content_type,
        body,
    } = state
        .downloads
        .open(DownloadRequest {
            record_id: id,
            owner_id,
            start,
            end,
        })
        .await?;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, range.content_length())
        .header(header::ACCEPT_RANGES, "bytes");

    builder = if range_header.is_some() {
        builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range_header(object_size))
    } else {
        builder.status(StatusCode::OK)
    };

    builder.body(Body::from_stream(body)).map_err(|e| {
        HttpAppError(AppError::Internal(format!(
            "failed to build download response: {}",
            e
        )))
    })
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Parse a single `bytes=start-end` or `bytes=start-` range.
///
/// An open end becomes `-1` so the downloader clamps it to the object's last byte.
/// Suffix and multi-range forms are rejected.
fn parse_range_header(headers: &HeaderMap) -> Result<Option<(i64, i64)>, AppError> {
    let Some(value) = headers.get(header::RANGE) else {
        return Ok(None);
    };
    let invalid = || AppError::InvalidInput("invalid range".to_string());

    let spec = value
        .to_str()
        .map_err(|_| invalid())?
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(invalid)?;
    if spec.contains(',') {
        return Err(invalid());
    }

    let (start, end) = spec.split_once('-').ok_or_else(invalid)?;
    let start: i64 = start.trim().parse().map_err(|_| invalid())?;
    let end: i64 = match end.trim() {
        "" => -1,
        end => end.parse().map_err(|_| invalid())?,
    };
    if end < -1 {
        return Err(invalid());
    }

    Ok(Some((start, end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn range(value: &str) -> Result<Option<(i64, i64)>, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_str(value).unwrap());
        parse_range_header(&headers)
    }

    #[test]
    fn test_parse_closed_and_open_ranges() {
        assert_eq!(range("bytes=0-99").unwrap(), Some((0, 99)));
        assert_eq!(range("bytes=500-").unwrap(), Some((500, -1)));
        assert_eq!(range(" bytes=7-7 ").unwrap(), Some((7, 7)));
    }

    #[test]
    fn test_reject_unsupported_range_forms() {
        for value in ["bytes=-500", "bytes=0-1,5-9", "items=0-1", "bytes=a-b", "bytes=5"] {
            assert!(range(value).is_err(), "{} should be rejected", value);
        }
    }

    #[test]
    fn test_no_range_header() {
        assert_eq!(parse_range_header(&HeaderMap::new()).unwrap(), None);
    }
}
