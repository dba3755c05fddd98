use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::shared_files::models::{NewSharedFile, SharedFile, SharedFileChanges};

#[async_trait]
pub trait SharedFileRepository: Send + Sync {
    /// Shares granted to `user_id`, oldest first
    async fn list_by_recipient(&self, user_id: Uuid) -> Result<Vec<SharedFile>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SharedFile>>;

    async fn create(&self, share: NewSharedFile) -> Result<SharedFile>;

    async fn update(&self, id: Uuid, changes: SharedFileChanges) -> Result<SharedFile>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct PgSharedFileRepository {
    pool: PgPool,
}

impl PgSharedFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SharedFileRepository for PgSharedFileRepository {
    async fn list_by_recipient(&self, user_id: Uuid) -> Result<Vec<SharedFile>> {
        sqlx::query_as::<_, SharedFile>(
            r#"
            SELECT id, file_id, shared_with_id, permission, created_at
            FROM shared_files
            WHERE shared_with_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list shared files: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SharedFile>> {
        sqlx::query_as::<_, SharedFile>(
            r#"
            SELECT id, file_id, shared_with_id, permission, created_at
            FROM shared_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get shared file: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, share: NewSharedFile) -> Result<SharedFile> {
        sqlx::query_as::<_, SharedFile>(
            r#"
            INSERT INTO shared_files (id, file_id, shared_with_id, permission)
            VALUES ($1, $2, $3, $4)
            RETURNING id, file_id, shared_with_id, permission, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(share.file_id)
        .bind(share.shared_with_id)
        .bind(&share.permission)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create shared file: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, changes: SharedFileChanges) -> Result<SharedFile> {
        sqlx::query_as::<_, SharedFile>(
            r#"
            UPDATE shared_files
            SET file_id = COALESCE($2, file_id),
                permission = COALESCE($3, permission)
            WHERE id = $1
            RETURNING id, file_id, shared_with_id, permission, created_at
            "#,
        )
        .bind(id)
        .bind(changes.file_id)
        .bind(changes.permission)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update shared file: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Shared file not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM shared_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete shared file: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
