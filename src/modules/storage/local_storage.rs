//! Filesystem storage backend
//!
//! Objects are written below `media_root` using their key as a relative path.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::ObjectStorage;
use crate::core::error::AppError;

pub struct LocalStorage {
    root: PathBuf,
    media_url: String,
}

impl LocalStorage {
    pub fn new(root: PathBuf, media_url: String) -> Self {
        Self { root, media_url }
    }

    /// Create the media root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create media root '{}': {}",
                self.root.display(),
                e
            ))
        })?;
        info!("Local storage ready at {}", self.root.display());
        Ok(())
    }

    /// Resolve a key below the root, rejecting anything that could escape it
    fn resolve(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if key.is_empty() || !is_plain {
            return Err(AppError::Storage(format!("Invalid object key '{}'", key)));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::Storage(format!("Failed to create directory for '{}': {}", key, e))
            })?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write '{}': {}", key, e)))?;

        debug!("Stored '{}' at {}", key, path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.resolve(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted '{}'", key);
                Ok(())
            }
            // Already gone
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete '{}': {}",
                key, e
            ))),
        }
    }

    async fn file_url(&self, key: &str) -> Result<String, AppError> {
        Ok(format!("{}/{}", self.media_url, key))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
