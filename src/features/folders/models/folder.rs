use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::ownership::Owned;

/// Database model for folders
#[derive(Debug, Clone, FromRow)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFolder {
    pub name: String,
    pub owner_id: Uuid,
}

impl Owned for Folder {
    fn owner_ref(&self) -> Uuid {
        self.owner_id
    }
}
