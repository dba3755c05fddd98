use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::repositories::FileRepository;
use crate::features::shared_files::dtos::{
    CreateSharedFileDto, SharedFileResponseDto, UpdateSharedFileDto,
};
use crate::features::shared_files::models::{NewSharedFile, SharedFile, SharedFileChanges};
use crate::features::shared_files::repositories::SharedFileRepository;
use crate::shared::ownership::ensure_owned;

/// Service for share grants, scoped to the recipient
pub struct SharedFileService {
    shares: Arc<dyn SharedFileRepository>,
    files: Arc<dyn FileRepository>,
}

impl SharedFileService {
    pub fn new(shares: Arc<dyn SharedFileRepository>, files: Arc<dyn FileRepository>) -> Self {
        Self { shares, files }
    }

    /// List shares granted to the caller
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<SharedFileResponseDto>> {
        self.shares
            .list_by_recipient(user.id)
            .await?
            .into_iter()
            .map(SharedFileResponseDto::try_from)
            .collect()
    }

    /// Create a share whose recipient is the caller
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateSharedFileDto,
    ) -> Result<SharedFileResponseDto> {
        self.ensure_file_exists(dto.file).await?;

        let share = self
            .shares
            .create(NewSharedFile {
                file_id: dto.file,
                shared_with_id: user.id,
                permission: dto.permission.as_str().to_string(),
            })
            .await?;

        tracing::info!("Share {} of file {} created for {}", share.id, share.file_id, user.id);
        share.try_into()
    }

    /// Get a share granted to the caller
    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<SharedFileResponseDto> {
        self.find_owned(user, id).await?.try_into()
    }

    /// Change the file or permission of a share granted to the caller
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateSharedFileDto,
    ) -> Result<SharedFileResponseDto> {
        let share = self.find_owned(user, id).await?;

        if let Some(file_id) = dto.file {
            self.ensure_file_exists(file_id).await?;
        }

        if dto.file.is_none() && dto.permission.is_none() {
            return share.try_into();
        }

        self.shares
            .update(
                share.id,
                SharedFileChanges {
                    file_id: dto.file,
                    permission: dto.permission.map(|p| p.as_str().to_string()),
                },
            )
            .await?
            .try_into()
    }

    /// Delete a share granted to the caller
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let share = self.find_owned(user, id).await?;
        self.shares.delete(share.id).await?;

        tracing::info!("Share {} deleted by {}", share.id, user.id);
        Ok(())
    }

    async fn find_owned(&self, user: &AuthenticatedUser, id: Uuid) -> Result<SharedFile> {
        ensure_owned(self.shares.find_by_id(id).await?, user, "Shared file")
    }

    async fn ensure_file_exists(&self, file_id: Uuid) -> Result<()> {
        match self.files.find_by_id(file_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!(
                "file: Invalid id \"{}\" - object does not exist.",
                file_id
            ))),
        }
    }
}
