//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p kinora-api`. The catalog is in memory and
//! objects live in a temp dir, so no external services are needed.

#![allow(dead_code)]

use axum_test::TestServer;
use kinora_api::setup::{routes, services};
use kinora_core::constants::API_PREFIX;
use kinora_db::InMemoryMediaStore;
use kinora_services::NoOpCache;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const OWNER: &str = "owner-1";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<InMemoryMediaStore>,
    pub _temp_dir: TempDir,
}

pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = Arc::new(
        kinora_storage::LocalStorage::new(
            temp_dir.path().join("objects"),
            "http://localhost:3000/media".to_string(),
        )
        .await
        .expect("Failed to create local storage"),
    );
    let store = Arc::new(InMemoryMediaStore::new());

    let state = services::build_state(
        store.clone(),
        storage,
        Arc::new(NoOpCache),
        Duration::from_secs(60),
        Some(temp_dir.path().to_path_buf()),
        None,
    );
    let server = TestServer::new(routes::setup_routes(state)).expect("Failed to start test server");

    TestApp {
        server,
        store,
        _temp_dir: temp_dir,
    }
}

impl TestApp {
    pub async fn create_media(&self, owner: &str, title: &str) -> Value {
        let response = self
            .server
            .post(&api_path("/media"))
            .json(&json!({ "title": title, "owner_id": owner }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }

    pub async fn upload(&self, id: &str, file_name: &str, data: &[u8]) -> Value {
        let response = self
            .server
            .put(&api_path(&format!("/media/{}/content", id)))
            .add_query_param("file_name", file_name)
            .bytes(bytes::Bytes::copy_from_slice(data))
            .await;
        response.assert_status_ok();
        response.json::<Value>()
    }
}
