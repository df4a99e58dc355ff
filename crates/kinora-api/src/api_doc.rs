//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use kinora_core::models;

pub fn openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kinora API",
        version = "0.1.0",
        description = "Media transfer service (v0): record catalog, streamed uploads into object storage, and ranged downloads. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // Records
        handlers::media::create_media,
        handlers::media::get_media,
        handlers::media::update_media,
        handlers::media::delete_media,
        handlers::media::list_media,
        // Transfer
        handlers::transfer::upload_content,
        handlers::transfer::download_content,
        handlers::direct::upload_url,
        handlers::direct::upload_complete,
        handlers::direct::download_url,
    ),
    components(
        schemas(
            models::MediaStatus,
            models::MediaResponse,
            models::MediaListResponse,
            models::CreateMediaRequest,
            models::UpdateMediaRequest,
            models::UploadOutcome,
            kinora_services::PresignedUrl,
            handlers::direct::DirectUploadRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "media", description = "Media record catalog operations"),
        (name = "transfer", description = "Streamed uploads, ranged downloads, and presigned direct transfers")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_transfer_paths() {
        let spec = openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v0/media/{id}/content"));
        assert!(spec.paths.paths.contains_key("/api/v0/media"));
    }
}
