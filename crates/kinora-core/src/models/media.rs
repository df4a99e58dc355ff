use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use crate::constants::{DEFAULT_LIST_LIMIT, FALLBACK_CONTENT_TYPE, MAX_LIST_LIMIT};

/// Lifecycle of a record's content.
///
/// Records are created `Pending` with an empty storage path and flip to `Ready`
/// only when an upload commit has stored the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "media_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MediaStatus {
    Pending,
    Ready,
}

/// Catalog entry describing one media object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct MediaRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content_type: String,
    /// Object key in the backing store; empty until the first upload commits.
    pub storage_path: String,
    pub owner_id: String,
    pub status: MediaStatus,
    pub created_at: DateTime<Utc>,
}

impl MediaRecord {
    /// New pending record with a fresh identifier and no content.
    pub fn new_pending(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        content_type: Option<String>,
    ) -> Self {
        MediaRecord {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            content_type: content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
            storage_path: String::new(),
            owner_id: owner_id.into(),
            status: MediaStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Whether the record references retrievable content.
    pub fn has_content(&self) -> bool {
        self.status == MediaStatus::Ready && !self.storage_path.is_empty()
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

/// Record as returned to callers, with the derived access URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub content_type: String,
    pub storage_path: String,
    pub owner_id: String,
    pub status: MediaStatus,
    pub created_at: DateTime<Utc>,
    /// Time-limited access URL; null while the record has no content
    pub url: Option<String>,
    /// Stored object size in bytes, when known
    pub size: Option<u64>,
}

impl MediaResponse {
    pub fn from_record(record: MediaRecord, url: Option<String>, size: Option<u64>) -> Self {
        MediaResponse {
            id: record.id,
            title: record.title,
            description: record.description,
            content_type: record.content_type,
            storage_path: record.storage_path,
            owner_id: record.owner_id,
            status: record.status,
            created_at: record.created_at,
            url,
            size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaListResponse {
    pub items: Vec<MediaResponse>,
}

/// Request DTO for creating a media record
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMediaRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: String,
    /// Initial content type; replaced by the inferred type on upload
    #[serde(default)]
    #[validate(length(max = 255, message = "Content type must be at most 255 characters"))]
    pub content_type: Option<String>,
    /// Owner identifier; falls back to the `X-Owner-Id` header when omitted
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Owner id must be between 1 and 255 characters"
    ))]
    pub owner_id: Option<String>,
}

/// Request DTO for updating a media record. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateMediaRequest {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: Option<String>,
    #[serde(default)]
    #[validate(length(max = 4096, message = "Description must be at most 4096 characters"))]
    pub description: Option<String>,
}

/// Query parameters for listing an owner's records
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMediaQuery {
    pub owner_id: String,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListMediaQuery {
    /// Limit clamped to `1..=MAX_LIST_LIMIT`; missing or non-positive uses the default.
    pub fn effective_limit(&self) -> i64 {
        match self.limit {
            Some(limit) if limit > 0 => limit.min(MAX_LIST_LIMIT),
            _ => DEFAULT_LIST_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_pending_without_content() {
        let record = MediaRecord::new_pending("owner-1", "clip", "", None);
        assert_eq!(record.status, MediaStatus::Pending);
        assert!(record.storage_path.is_empty());
        assert!(!record.has_content());
        assert_eq!(record.content_type, FALLBACK_CONTENT_TYPE);
        assert!(record.is_owned_by("owner-1"));
        assert!(!record.is_owned_by("owner-2"));
    }

    #[test]
    fn test_ready_record_needs_storage_path() {
        let mut record = MediaRecord::new_pending("o", "t", "d", Some("video/mp4".into()));
        record.status = MediaStatus::Ready;
        assert!(!record.has_content());
        record.storage_path = "o/id/clip.mp4".into();
        assert!(record.has_content());
    }

    #[test]
    fn test_effective_limit() {
        let query = |limit| ListMediaQuery {
            owner_id: "o".into(),
            limit,
        };
        assert_eq!(query(None).effective_limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(query(Some(0)).effective_limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(query(Some(-3)).effective_limit(), DEFAULT_LIST_LIMIT);
        assert_eq!(query(Some(10)).effective_limit(), 10);
        assert_eq!(query(Some(50_000)).effective_limit(), MAX_LIST_LIMIT);
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateMediaRequest {
            title: String::new(),
            description: String::new(),
            content_type: None,
            owner_id: Some("o".into()),
        };
        assert!(req.validate().is_err());

        let req = CreateMediaRequest {
            title: "clip".into(),
            description: String::new(),
            content_type: None,
            owner_id: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MediaStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
