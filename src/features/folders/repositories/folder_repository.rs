use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::folders::models::{Folder, NewFolder};

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Folders owned by `owner_id`, oldest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Folder>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>>;

    async fn create(&self, folder: NewFolder) -> Result<Folder>;

    async fn rename(&self, id: Uuid, name: &str) -> Result<Folder>;

    /// Delete the folder; its files and their shares go with it
    async fn delete(&self, id: Uuid) -> Result<()>;
}

pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM folders
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list folders: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM folders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get folder: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn create(&self, folder: NewFolder) -> Result<Folder> {
        sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (id, name, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&folder.name)
        .bind(folder.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create folder: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Folder> {
        sqlx::query_as::<_, Folder>(
            r#"
            UPDATE folders
            SET name = $2
            WHERE id = $1
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to rename folder: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete folder: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
