use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::dtos::FileResponseDto;
use crate::features::folders::models::Folder;

/// Request DTO for creating a folder
///
/// An `owner` field in the body is ignored; the caller owns the folder.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFolderDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Request DTO for updating a folder; omitted fields keep their value
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFolderDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
}

impl CreateFolderDto {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
        }
    }
}

impl UpdateFolderDto {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
        }
    }
}

/// Response DTO for folder operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderResponseDto {
    pub id: Uuid,
    pub name: String,
    /// Owning user id
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    /// Files contained in the folder (read-only)
    pub files: Vec<FileResponseDto>,
}

impl FolderResponseDto {
    pub fn new(folder: Folder, files: Vec<FileResponseDto>) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            owner: folder.owner_id,
            created_at: folder.created_at,
            files,
        }
    }
}
