use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::files::models::File;
use crate::modules::storage::ObjectStorage;

/// Multipart file form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The handlers parse the body into `FileFormDto`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The payload to store (required on create)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
    /// Display name, 1-100 characters (required on create)
    #[schema(example = "notes.txt")]
    pub name: Option<String>,
    /// Id of a folder owned by the caller (required on create)
    pub folder: Option<Uuid>,
}

/// JSON body for renaming a file or moving it to another folder
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFileDto {
    /// New display name, 1-100 characters
    #[schema(example = "notes.txt")]
    pub name: Option<String>,
    /// Id of another folder owned by the caller
    pub folder: Option<Uuid>,
}

impl From<UpdateFileDto> for FileFormDto {
    fn from(dto: UpdateFileDto) -> Self {
        Self {
            name: dto.name.map(|name| name.trim().to_string()),
            folder: dto.folder,
            payload: None,
        }
    }
}

/// Uploaded payload taken from the `file` part
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Parsed multipart form shared by create and update
#[derive(Debug, Default, Validate)]
pub struct FileFormDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    pub folder: Option<Uuid>,

    pub payload: Option<FilePayload>,
}

impl FileFormDto {
    /// Read the `file`, `name` and `folder` parts; other parts (such as `owner`) are ignored
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error("multipart data", e))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "file" => {
                    let content_type = field
                        .content_type()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "application/octet-stream".to_string());
                    let filename = field
                        .file_name()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unnamed".to_string());

                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| multipart_error("file data", e))?;

                    form.payload = Some(FilePayload {
                        filename,
                        content_type,
                        data: data.to_vec(),
                    });
                }
                "name" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("name field", e))?;
                    form.name = Some(text.trim().to_string());
                }
                "folder" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| multipart_error("folder field", e))?;
                    let folder = Uuid::parse_str(text.trim()).map_err(|_| {
                        AppError::Validation(format!("folder: '{}' is not a valid id", text.trim()))
                    })?;
                    form.folder = Some(folder);
                }
                _ => {
                    debug!("Ignoring unknown field: {}", field_name);
                }
            }
        }

        Ok(form)
    }

    /// Field-level checks beyond the derive: an uploaded payload must not be empty
    pub fn check(&self) -> Result<()> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => vec![e.to_string()],
        };

        if self.payload.as_ref().is_some_and(|p| p.data.is_empty()) {
            errors.push("file: The submitted file is empty.".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors.join("\n")))
        }
    }

    /// Take the name, folder and payload needed to create a file, reporting every missing part
    pub fn into_required(self) -> Result<(String, Uuid, FilePayload)> {
        match (self.name, self.folder, self.payload) {
            (Some(name), Some(folder), Some(payload)) => Ok((name, folder, payload)),
            (name, folder, payload) => {
                let mut missing = Vec::new();
                if payload.is_none() {
                    missing.push("file: No file was submitted.");
                }
                if name.is_none() {
                    missing.push("name: This field is required.");
                }
                if folder.is_none() {
                    missing.push("folder: This field is required.");
                }
                Err(AppError::Validation(missing.join("\n")))
            }
        }
    }
}

/// JSON bodies carry name and folder only; anything else is read as multipart
impl<S> FromRequest<S> for FileFormDto
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        if is_json(req.headers()) {
            let Json(dto) = Json::<UpdateFileDto>::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
            return Ok(dto.into());
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| body_error(rejection.status(), rejection.body_text()))?;
        Self::from_multipart(multipart).await
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

fn multipart_error(what: &str, e: MultipartError) -> AppError {
    debug!("Failed to read {}: {}", what, e);
    body_error(e.status(), format!("Failed to read {}: {}", what, e))
}

/// Oversized bodies keep their 413; anything else is a malformed request
fn body_error(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body is too large".to_string())
    } else {
        AppError::BadRequest(detail)
    }
}

/// Response DTO for file operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    /// URL of the stored payload
    pub file: String,
    pub name: String,
    /// Containing folder id
    pub folder: Uuid,
    /// Owning user id
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub async fn from_file(file: File, storage: &dyn ObjectStorage) -> Result<Self> {
        Ok(Self {
            file: storage.file_url(&file.file_key).await?,
            id: file.id,
            name: file.name,
            folder: file.folder_id,
            owner: file.owner_id,
            created_at: file.created_at,
        })
    }
}
