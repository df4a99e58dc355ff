//! Route configuration and setup.
//!
//! Health checks live in [health](health); the startup listing in [report](report).

mod health;
pub mod report;

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use kinora_core::constants::API_PREFIX;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .merge(public_routes())
        .merge(media_routes())
        .merge(transfer_routes())
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::openapi_spec()) }),
        )
}

fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/media", API_PREFIX),
            post(handlers::media::create_media).get(handlers::media::list_media),
        )
        .route(
            &format!("{}/media/{{id}}", API_PREFIX),
            get(handlers::media::get_media)
                .patch(handlers::media::update_media)
                .delete(handlers::media::delete_media),
        )
}

fn transfer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/media/{{id}}/content", API_PREFIX),
            get(handlers::transfer::download_content).put(handlers::transfer::upload_content),
        )
        .route(
            &format!("{}/media/{{id}}/upload-url", API_PREFIX),
            post(handlers::direct::upload_url),
        )
        .route(
            &format!("{}/media/{{id}}/upload-complete", API_PREFIX),
            post(handlers::direct::upload_complete),
        )
        .route(
            &format!("{}/media/{{id}}/download-url", API_PREFIX),
            get(handlers::direct::download_url),
        )
}
