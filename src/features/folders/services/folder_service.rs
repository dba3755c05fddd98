use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::FileResponseDto;
use crate::features::files::models::File;
use crate::features::files::repositories::FileRepository;
use crate::features::folders::dtos::{CreateFolderDto, FolderResponseDto, UpdateFolderDto};
use crate::features::folders::models::{Folder, NewFolder};
use crate::features::folders::repositories::FolderRepository;
use crate::modules::storage::{delete_best_effort, ObjectStorage};
use crate::shared::ownership::ensure_owned;

/// Service for owner-scoped folders
pub struct FolderService {
    folders: Arc<dyn FolderRepository>,
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl FolderService {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            folders,
            files,
            storage,
        }
    }

    /// List folders owned by the caller, each with its files
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<FolderResponseDto>> {
        let folders = self.folders.list_by_owner(user.id).await?;
        let ids: Vec<Uuid> = folders.iter().map(|f| f.id).collect();

        let mut by_folder: HashMap<Uuid, Vec<FileResponseDto>> = HashMap::new();
        for file in self.files.list_by_folders(&ids).await? {
            let folder_id = file.folder_id;
            let response = FileResponseDto::from_file(file, self.storage.as_ref()).await?;
            by_folder.entry(folder_id).or_default().push(response);
        }

        Ok(folders
            .into_iter()
            .map(|folder| {
                let files = by_folder.remove(&folder.id).unwrap_or_default();
                FolderResponseDto::new(folder, files)
            })
            .collect())
    }

    /// Create a folder owned by the caller
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateFolderDto,
    ) -> Result<FolderResponseDto> {
        let folder = self
            .folders
            .create(NewFolder {
                name: dto.name,
                owner_id: user.id,
            })
            .await?;

        tracing::info!("Folder {} created by {}", folder.id, user.id);
        Ok(FolderResponseDto::new(folder, Vec::new()))
    }

    /// Get a folder owned by the caller
    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<FolderResponseDto> {
        let folder = self.find_owned(user, id).await?;
        self.with_files(folder).await
    }

    /// Rename a folder owned by the caller
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateFolderDto,
    ) -> Result<FolderResponseDto> {
        let folder = self.find_owned(user, id).await?;

        let folder = match dto.name {
            Some(name) if name != folder.name => self.folders.rename(folder.id, &name).await?,
            _ => folder,
        };

        self.with_files(folder).await
    }

    /// Delete a folder owned by the caller together with its files and their payloads
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let folder = self.find_owned(user, id).await?;
        let contained: Vec<File> = self.files.list_by_folders(&[folder.id]).await?;

        self.folders.delete(folder.id).await?;

        for file in &contained {
            delete_best_effort(self.storage.as_ref(), &file.file_key).await;
        }

        tracing::info!(
            "Folder {} deleted by {} ({} files removed)",
            folder.id,
            user.id,
            contained.len()
        );
        Ok(())
    }

    async fn find_owned(&self, user: &AuthenticatedUser, id: Uuid) -> Result<Folder> {
        ensure_owned(self.folders.find_by_id(id).await?, user, "Folder")
    }

    async fn with_files(&self, folder: Folder) -> Result<FolderResponseDto> {
        let mut files = Vec::new();
        for file in self.files.list_by_folders(&[folder.id]).await? {
            files.push(FileResponseDto::from_file(file, self.storage.as_ref()).await?);
        }
        Ok(FolderResponseDto::new(folder, files))
    }
}
