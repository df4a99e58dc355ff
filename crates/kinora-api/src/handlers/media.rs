use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::extract::{resolve_owner, OwnerHeader};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use kinora_core::models::{
    CreateMediaRequest, ListMediaQuery, MediaListResponse, MediaResponse, UpdateMediaRequest,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v0/media",
    tag = "media",
    request_body = CreateMediaRequest,
    params(
        ("X-Owner-Id" = Option<String>, Header, description = "Owner when the body omits owner_id")
    ),
    responses(
        (status = 201, description = "Media record created", body = MediaResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, owner_header, request), fields(operation = "create_media"))]
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    owner_header: OwnerHeader,
    ValidatedJson(request): ValidatedJson<CreateMediaRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner_id = resolve_owner(request.owner_id.clone(), owner_header)?;
    let media = state.media.create(&owner_id, request).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media found", body = MediaResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(media_id = %id, operation = "get_media"))]
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaResponse>, HttpAppError> {
    Ok(Json(state.media.get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Media updated", body = MediaResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(media_id = %id, operation = "update_media"))]
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMediaRequest>,
) -> Result<Json<MediaResponse>, HttpAppError> {
    Ok(Json(state.media.update(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 204, description = "Media deleted successfully"),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(media_id = %id, operation = "delete_media"))]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.media.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v0/media",
    tag = "media",
    params(ListMediaQuery),
    responses(
        (status = 200, description = "Owner's media, newest first", body = MediaListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_media"))]
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListMediaQuery>, QueryRejection>,
) -> Result<Json<MediaListResponse>, HttpAppError> {
    let Query(query) = query?;
    let items = state
        .media
        .list(&query.owner_id, query.effective_limit())
        .await?;
    Ok(Json(MediaListResponse { items }))
}
