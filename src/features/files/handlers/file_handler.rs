use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppPath;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::dtos::{FileFormDto, FileResponseDto, UpdateFileDto, UploadFileDto};
use crate::features::files::services::FileService;
use crate::shared::types::ApiResponse;

/// List the caller's files
#[utoipa::path(
    get,
    path = "/files/",
    tag = "files",
    responses(
        (status = 200, description = "Files owned by the caller", body = ApiResponse<Vec<FileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_files(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
) -> Result<Json<ApiResponse<Vec<FileResponseDto>>>> {
    let files = service.list(&user).await?;
    Ok(Json(ApiResponse::list(files)))
}

/// Upload a file into one of the caller's folders
///
/// Accepts multipart/form-data with `file`, `name` and `folder` parts.
/// Any `owner` part is ignored; the caller always owns the new file.
#[utoipa::path(
    post,
    path = "/files/",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Payload, display name and target folder",
    ),
    responses(
        (status = 201, description = "File created", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Missing or invalid parts"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    form: FileFormDto,
) -> Result<(StatusCode, Json<ApiResponse<FileResponseDto>>)> {
    let file = service.create(&user, form).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(file),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// Get one of the caller's files
#[utoipa::path(
    get,
    path = "/files/{id}/",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File found", body = ApiResponse<FileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// Update one of the caller's files
///
/// Every part is optional. A new `file` part replaces the stored payload.
/// A JSON body may rename the file or move it to another folder.
#[utoipa::path(
    put,
    path = "/files/{id}/",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    request_body(
        description = "Parts to change",
        content(
            (UploadFileDto = "multipart/form-data"),
            (UpdateFileDto = "application/json")
        )
    ),
    responses(
        (status = 200, description = "File updated", body = ApiResponse<FileResponseDto>),
        (status = 400, description = "Invalid parts"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
    form: FileFormDto,
) -> Result<Json<ApiResponse<FileResponseDto>>> {
    let file = service.update(&user, id, form).await?;
    Ok(Json(ApiResponse::success(Some(file), None, None)))
}

/// Delete one of the caller's files
#[utoipa::path(
    delete,
    path = "/files/{id}/",
    tag = "files",
    params(
        ("id" = Uuid, Path, description = "File id")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    user: AuthenticatedUser,
    State(service): State<Arc<FileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
