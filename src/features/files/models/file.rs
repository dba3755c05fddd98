use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::ownership::Owned;

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    /// Object storage key of the payload
    pub file_key: String,
    pub name: String,
    pub folder_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub file_key: String,
    pub name: String,
    pub folder_id: Uuid,
    pub owner_id: Uuid,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct FileChanges {
    pub file_key: Option<String>,
    pub name: Option<String>,
    pub folder_id: Option<Uuid>,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.file_key.is_none() && self.name.is_none() && self.folder_id.is_none()
    }
}

impl Owned for File {
    fn owner_ref(&self) -> Uuid {
        self.owner_id
    }
}
