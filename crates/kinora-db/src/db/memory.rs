//! In-memory catalog with the same observable semantics as [`PgMediaStore`](super::PgMediaStore).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use kinora_core::models::{MediaRecord, MediaStatus};
use kinora_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::media::MediaStore;

#[derive(Default)]
pub struct InMemoryMediaStore {
    records: RwLock<HashMap<Uuid, MediaRecord>>,
    fail_commits: AtomicBool,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `commit_content` fail, to exercise rollback paths.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn create(&self, record: &MediaRecord) -> Result<MediaRecord, AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppError::Internal(format!(
                "duplicate media id {}",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_details(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<MediaRecord>, AppError> {
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = title {
            record.title = title.to_string();
        }
        if let Some(description) = description {
            record.description = description.to_string();
        }
        Ok(Some(record.clone()))
    }

    async fn commit_content(
        &self,
        id: Uuid,
        storage_path: &str,
        content_type: &str,
    ) -> Result<Option<MediaRecord>, AppError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(AppError::Internal("catalog unavailable".to_string()));
        }
        let mut records = self.records.write().await;
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        record.storage_path = storage_path.to_string();
        record.content_type = content_type.to_string();
        record.status = MediaStatus::Ready;
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        Ok(self.records.write().await.remove(&id))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<MediaRecord>, AppError> {
        let records = self.records.read().await;
        let mut owned: Vec<MediaRecord> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        owned.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(owner: &str, age_secs: i64) -> MediaRecord {
        let mut record = MediaRecord::new_pending(owner, "t", "d", None);
        record.created_at = Utc::now() - Duration::seconds(age_secs);
        record
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first_with_limit() {
        let store = InMemoryMediaStore::new();
        let oldest = store.create(&record("o", 30)).await.unwrap();
        let middle = store.create(&record("o", 20)).await.unwrap();
        let newest = store.create(&record("o", 10)).await.unwrap();
        store.create(&record("other", 0)).await.unwrap();

        let all = store.list_by_owner("o", 10).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

        let page = store.list_by_owner("o", 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_commit_content_marks_ready() {
        let store = InMemoryMediaStore::new();
        let created = store.create(&record("o", 0)).await.unwrap();

        let committed = store
            .commit_content(created.id, "o/x/clip.mp4", "video/mp4")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(committed.status, MediaStatus::Ready);
        assert!(committed.has_content());

        assert!(store
            .commit_content(Uuid::new_v4(), "p", "c")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_details_keeps_unset_fields() {
        let store = InMemoryMediaStore::new();
        let created = store.create(&record("o", 0)).await.unwrap();

        let updated = store
            .update_details(created.id, Some("new title"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.description, "d");
    }
}
