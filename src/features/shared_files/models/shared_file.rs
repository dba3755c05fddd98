use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::ownership::Owned;

/// Database model for share grants
#[derive(Debug, Clone, FromRow)]
pub struct SharedFile {
    pub id: Uuid,
    pub file_id: Uuid,
    pub shared_with_id: Uuid,
    /// `read_only` or `edit`
    pub permission: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSharedFile {
    pub file_id: Uuid,
    pub shared_with_id: Uuid,
    pub permission: String,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct SharedFileChanges {
    pub file_id: Option<Uuid>,
    pub permission: Option<String>,
}

/// A share is visible to its recipient
impl Owned for SharedFile {
    fn owner_ref(&self) -> Uuid {
        self.shared_with_id
    }
}
