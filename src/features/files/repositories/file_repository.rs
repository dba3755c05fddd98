use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::models::{File, FileChanges, NewFile};

#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Files owned by `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<File>>;

    /// Files contained in any of `folder_ids`, oldest first
    async fn list_by_folders(&self, folder_ids: &[Uuid]) -> Result<Vec<File>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>>;

    async fn create(&self, file: NewFile) -> Result<File>;

    async fn update(&self, id: Uuid, changes: FileChanges) -> Result<File>;

    /// Delete the file; shares of it go with it
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<File>> {
        sqlx::query_as::<_, File>(
            r#"
            SELECT id, file_key, name, folder_id, owner_id, created_at
            FROM files
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_by_folders(&self, folder_ids: &[Uuid]) -> Result<Vec<File>> {
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, File>(
            r#"
            SELECT id, file_key, name, folder_id, owner_id, created_at
            FROM files
            WHERE folder_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list files by folder: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        sqlx::query_as::<_, File>(
            r#"
            SELECT id, file_key, name, folder_id, owner_id, created_at
            FROM files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get file: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, file: NewFile) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (id, file_key, name, folder_id, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, file_key, name, folder_id, owner_id, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&file.file_key)
        .bind(&file.name)
        .bind(file.folder_id)
        .bind(file.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create file record: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn update(&self, id: Uuid, changes: FileChanges) -> Result<File> {
        sqlx::query_as::<_, File>(
            r#"
            UPDATE files
            SET file_key = COALESCE($2, file_key),
                name = COALESCE($3, name),
                folder_id = COALESCE($4, folder_id)
            WHERE id = $1
            RETURNING id, file_key, name, folder_id, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(changes.file_key)
        .bind(changes.name)
        .bind(changes.folder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update file record: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete file record: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
