//! Presigned URLs for clients that transfer directly against the object store.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::extract::{resolve_owner, OwnerHeader};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use kinora_core::models::UploadOutcome;
use kinora_services::PresignedUrl;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DirectUploadRequest {
    /// Owner of the record; falls back to the `X-Owner-Id` header
    #[serde(default)]
    pub owner_id: Option<String>,
    pub file_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    #[serde(default)]
    pub owner_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/upload-url",
    tag = "transfer",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = DirectUploadRequest,
    responses(
        (status = 200, description = "Presigned PUT URL", body = PresignedUrl),
        (status = 400, description = "Backend cannot presign uploads", body = ErrorResponse),
        (status = 403, description = "Caller does not own the record", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, owner_header, request), fields(media_id = %id))]
pub async fn upload_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    owner_header: OwnerHeader,
    ValidatedJson(request): ValidatedJson<DirectUploadRequest>,
) -> Result<Json<PresignedUrl>, HttpAppError> {
    let owner_id = resolve_owner(request.owner_id, owner_header)?;
    let presigned = state
        .media
        .upload_url(id, &owner_id, &request.file_name)
        .await?;
    Ok(Json(presigned))
}

#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/upload-complete",
    tag = "transfer",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = DirectUploadRequest,
    responses(
        (status = 200, description = "Direct upload committed", body = UploadOutcome),
        (status = 403, description = "Caller does not own the record", body = ErrorResponse),
        (status = 404, description = "Media or uploaded object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, owner_header, request), fields(media_id = %id))]
pub async fn upload_complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    owner_header: OwnerHeader,
    ValidatedJson(request): ValidatedJson<DirectUploadRequest>,
) -> Result<Json<UploadOutcome>, HttpAppError> {
    let owner_id = resolve_owner(request.owner_id, owner_header)?;
    let outcome = state
        .media
        .complete_direct_upload(id, &owner_id, &request.file_name)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}/download-url",
    tag = "transfer",
    params(
        ("id" = Uuid, Path, description = "Media ID"),
        OwnerQuery
    ),
    responses(
        (status = 200, description = "Presigned GET URL", body = PresignedUrl),
        (status = 403, description = "Caller does not own the record", body = ErrorResponse),
        (status = 404, description = "Media not found or has no content", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, owner_header, query), fields(media_id = %id))]
pub async fn download_url(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    owner_header: OwnerHeader,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<PresignedUrl>, HttpAppError> {
    let Query(query) = query?;
    let owner_id = resolve_owner(query.owner_id, owner_header)?;
    Ok(Json(state.media.download_url(id, &owner_id).await?))
}
