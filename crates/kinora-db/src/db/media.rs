use kinora_core::models::{MediaRecord, MediaStatus};
use kinora_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Media catalog operations.
///
/// Every call is one round trip to durable storage. Concurrent writers to the same
/// record are not serialized here; the last write wins.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Insert a new record.
    async fn create(&self, record: &MediaRecord) -> Result<MediaRecord, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError>;

    /// Update title and/or description; `None` keeps the stored value.
    async fn update_details(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<MediaRecord>, AppError>;

    /// Point the record at newly stored content and mark it ready, in one write.
    async fn commit_content(
        &self,
        id: Uuid,
        storage_path: &str,
        content_type: &str,
    ) -> Result<Option<MediaRecord>, AppError>;

    /// Remove a record, returning what was deleted.
    async fn delete(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError>;

    /// Records of one owner, newest first, at most `limit`.
    async fn list_by_owner(&self, owner_id: &str, limit: i64)
        -> Result<Vec<MediaRecord>, AppError>;
}

const MEDIA_COLUMNS: &str =
    "id, title, description, content_type, storage_path, owner_id, status, created_at";

/// PostgreSQL-backed media catalog
#[derive(Clone)]
pub struct PgMediaStore {
    pool: PgPool,
}

impl PgMediaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MediaStore for PgMediaStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "media", db.operation = "insert", media_id = %record.id))]
    async fn create(&self, record: &MediaRecord) -> Result<MediaRecord, AppError> {
        let query = format!(
            r#"
            INSERT INTO media (id, title, description, content_type, storage_path, owner_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let created = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(record.id)
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.content_type)
            .bind(&record.storage_path)
            .bind(&record.owner_id)
            .bind(record.status)
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select_one"))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let query = format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLUMNS);

        let record = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self, title, description), fields(db.table = "media", db.operation = "update"))]
    async fn update_details(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<MediaRecord>, AppError> {
        let query = format!(
            r#"
            UPDATE media
            SET title = COALESCE($2, title),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let record = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(id)
            .bind(title)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update"))]
    async fn commit_content(
        &self,
        id: Uuid,
        storage_path: &str,
        content_type: &str,
    ) -> Result<Option<MediaRecord>, AppError> {
        let query = format!(
            r#"
            UPDATE media
            SET storage_path = $2,
                content_type = $3,
                status = $4
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let record = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(id)
            .bind(storage_path)
            .bind(content_type)
            .bind(MediaStatus::Ready)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<Option<MediaRecord>, AppError> {
        let query = format!("DELETE FROM media WHERE id = $1 RETURNING {}", MEDIA_COLUMNS);

        let record = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select_list"))]
    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: i64,
    ) -> Result<Vec<MediaRecord>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM media
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
            MEDIA_COLUMNS
        );

        let records = sqlx::query_as::<Postgres, MediaRecord>(&query)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
