use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::shared_files::models::SharedFile;

/// Access level granted by a share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PermissionDto {
    ReadOnly,
    Edit,
}

impl PermissionDto {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionDto::ReadOnly => "read_only",
            PermissionDto::Edit => "edit",
        }
    }
}

impl TryFrom<&str> for PermissionDto {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "read_only" => Ok(PermissionDto::ReadOnly),
            "edit" => Ok(PermissionDto::Edit),
            other => Err(AppError::Internal(format!(
                "Unknown permission stored: {}",
                other
            ))),
        }
    }
}

/// Request DTO for creating a share
///
/// The recipient is always the caller; a `shared_with` field in the body is ignored.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSharedFileDto {
    /// Id of the shared file
    pub file: Uuid,
    pub permission: PermissionDto,
}

/// Request DTO for updating a share; omitted fields keep their value
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSharedFileDto {
    pub file: Option<Uuid>,
    pub permission: Option<PermissionDto>,
}

/// Response DTO for share operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedFileResponseDto {
    pub id: Uuid,
    /// Id of the shared file
    pub file: Uuid,
    /// Recipient user id
    pub shared_with: Uuid,
    pub permission: PermissionDto,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SharedFile> for SharedFileResponseDto {
    type Error = AppError;

    fn try_from(share: SharedFile) -> Result<Self, Self::Error> {
        Ok(Self {
            permission: PermissionDto::try_from(share.permission.as_str())?,
            id: share.id,
            file: share.file_id,
            shared_with: share.shared_with_id,
            created_at: share.created_at,
        })
    }
}
