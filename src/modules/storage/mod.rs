//! Storage module for file payloads
//!
//! Uploaded file contents live outside the database. The `ObjectStorage`
//! trait is the seam; a local-filesystem backend and a MinIO/S3 backend
//! implement it and the active one is chosen from `StorageConfig`.

mod local_storage;
mod minio_client;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::{StorageBackend, StorageConfig};
use crate::core::error::AppError;

pub use local_storage::LocalStorage;
pub use minio_client::MinIOClient;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, replacing anything already there
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Reference handed to API clients for the object stored under `key`
    async fn file_url(&self, key: &str) -> Result<String, AppError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Build the configured storage backend
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, AppError> {
    match config.backend {
        StorageBackend::Local => {
            let storage = LocalStorage::new(config.media_root.clone(), config.media_url.clone());
            storage.ensure_root().await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::MinIO => Ok(Arc::new(MinIOClient::new(config.minio.clone()).await?)),
    }
}

/// Delete an object, logging instead of failing
pub async fn delete_best_effort(storage: &dyn ObjectStorage, key: &str) {
    if let Err(e) = storage.delete(key).await {
        tracing::warn!(
            "Failed to remove stored object '{}' from {} storage: {}",
            key,
            storage.name(),
            e
        );
    }
}

/// Build an object key: `files/{owner_id}/{object_id}/{sanitized filename}`
pub fn object_key(owner_id: &uuid::Uuid, object_id: &uuid::Uuid, filename: &str) -> String {
    format!(
        "files/{}/{}/{}",
        owner_id,
        object_id,
        sanitize_filename(filename)
    )
}

/// Keep only the final path segment and replace characters unsafe in object keys
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned.to_string()
    }
}
