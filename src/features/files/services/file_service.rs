use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{FileFormDto, FilePayload, FileResponseDto};
use crate::features::files::models::{File, FileChanges, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::features::folders::repositories::FolderRepository;
use crate::modules::storage::{delete_best_effort, object_key, ObjectStorage};
use crate::shared::ownership::ensure_owned;

/// Service for owner-scoped file records and their stored payloads
pub struct FileService {
    files: Arc<dyn FileRepository>,
    folders: Arc<dyn FolderRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRepository>,
        folders: Arc<dyn FolderRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            files,
            folders,
            storage,
        }
    }

    /// List files owned by the caller
    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<FileResponseDto>> {
        let files = self.files.list_by_owner(user.id).await?;

        let mut responses = Vec::with_capacity(files.len());
        for file in files {
            responses.push(self.to_response(file).await?);
        }
        Ok(responses)
    }

    /// Store the payload and create the record, owned by the caller
    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        form: FileFormDto,
    ) -> Result<FileResponseDto> {
        form.check()?;
        let (name, folder_id, payload) = form.into_required()?;

        self.ensure_folder_owned(user, folder_id).await?;

        let file_key = self.store_payload(user, payload).await?;

        let created = self
            .files
            .create(NewFile {
                file_key: file_key.clone(),
                name,
                folder_id,
                owner_id: user.id,
            })
            .await;

        let file = match created {
            Ok(file) => file,
            Err(e) => {
                delete_best_effort(self.storage.as_ref(), &file_key).await;
                return Err(e);
            }
        };

        tracing::info!("File {} created by {}", file.id, user.id);
        self.to_response(file).await
    }

    /// Get a file owned by the caller
    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<FileResponseDto> {
        let file = self.find_owned(user, id).await?;
        self.to_response(file).await
    }

    /// Apply the supplied parts; a new payload replaces the stored one
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        form: FileFormDto,
    ) -> Result<FileResponseDto> {
        form.check()?;

        let existing = self.find_owned(user, id).await?;

        if let Some(folder_id) = form.folder {
            self.ensure_folder_owned(user, folder_id).await?;
        }

        let mut changes = FileChanges {
            file_key: None,
            name: form.name,
            folder_id: form.folder,
        };

        if changes.is_empty() && form.payload.is_none() {
            return self.to_response(existing).await;
        }

        if let Some(payload) = form.payload {
            changes.file_key = Some(self.store_payload(user, payload).await?);
        }
        let new_key = changes.file_key.clone();

        let updated = match self.files.update(existing.id, changes).await {
            Ok(file) => file,
            Err(e) => {
                if let Some(key) = new_key {
                    delete_best_effort(self.storage.as_ref(), &key).await;
                }
                return Err(e);
            }
        };

        if updated.file_key != existing.file_key {
            delete_best_effort(self.storage.as_ref(), &existing.file_key).await;
        }

        self.to_response(updated).await
    }

    /// Delete a file owned by the caller along with its payload
    pub async fn delete(&self, user: &AuthenticatedUser, id: Uuid) -> Result<()> {
        let file = self.find_owned(user, id).await?;

        self.files.delete(file.id).await?;
        delete_best_effort(self.storage.as_ref(), &file.file_key).await;

        tracing::info!("File {} deleted by {}", file.id, user.id);
        Ok(())
    }

    async fn find_owned(&self, user: &AuthenticatedUser, id: Uuid) -> Result<File> {
        ensure_owned(self.files.find_by_id(id).await?, user, "File")
    }

    /// A file may only be placed in one of the caller's own folders
    async fn ensure_folder_owned(&self, user: &AuthenticatedUser, folder_id: Uuid) -> Result<()> {
        ensure_owned(self.folders.find_by_id(folder_id).await?, user, "Folder")
            .map(|_| ())
            .map_err(|_| AppError::Validation("folder: Invalid folder.".to_string()))
    }

    async fn store_payload(&self, user: &AuthenticatedUser, payload: FilePayload) -> Result<String> {
        let key = object_key(&user.id, &Uuid::new_v4(), &payload.filename);
        self.storage
            .upload(&key, payload.data, &payload.content_type)
            .await?;
        Ok(key)
    }

    async fn to_response(&self, file: File) -> Result<FileResponseDto> {
        FileResponseDto::from_file(file, self.storage.as_ref()).await
    }
}
