use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::shared_files::dtos::{
    CreateSharedFileDto, SharedFileResponseDto, UpdateSharedFileDto,
};
use crate::features::shared_files::services::SharedFileService;
use crate::shared::types::ApiResponse;

/// List shares granted to the caller
#[utoipa::path(
    get,
    path = "/shared-files/",
    tag = "shared-files",
    responses(
        (status = 200, description = "Shares granted to the caller", body = ApiResponse<Vec<SharedFileResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_shared_files(
    user: AuthenticatedUser,
    State(service): State<Arc<SharedFileService>>,
) -> Result<Json<ApiResponse<Vec<SharedFileResponseDto>>>> {
    let shares = service.list(&user).await?;
    Ok(Json(ApiResponse::list(shares)))
}

/// Create a share
#[utoipa::path(
    post,
    path = "/shared-files/",
    tag = "shared-files",
    request_body = CreateSharedFileDto,
    responses(
        (status = 201, description = "Share created", body = ApiResponse<SharedFileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_shared_file(
    user: AuthenticatedUser,
    State(service): State<Arc<SharedFileService>>,
    AppJson(dto): AppJson<CreateSharedFileDto>,
) -> Result<(StatusCode, Json<ApiResponse<SharedFileResponseDto>>)> {
    let share = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(share), None, None)),
    ))
}

/// Get a share granted to the caller
#[utoipa::path(
    get,
    path = "/shared-files/{id}/",
    tag = "shared-files",
    params(
        ("id" = Uuid, Path, description = "Share id")
    ),
    responses(
        (status = 200, description = "Share found", body = ApiResponse<SharedFileResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Share not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_shared_file(
    user: AuthenticatedUser,
    State(service): State<Arc<SharedFileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<SharedFileResponseDto>>> {
    let share = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(share), None, None)))
}

/// Update a share granted to the caller
#[utoipa::path(
    put,
    path = "/shared-files/{id}/",
    tag = "shared-files",
    params(
        ("id" = Uuid, Path, description = "Share id")
    ),
    request_body = UpdateSharedFileDto,
    responses(
        (status = 200, description = "Share updated", body = ApiResponse<SharedFileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Share not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_shared_file(
    user: AuthenticatedUser,
    State(service): State<Arc<SharedFileService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateSharedFileDto>,
) -> Result<Json<ApiResponse<SharedFileResponseDto>>> {
    let share = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(share), None, None)))
}

/// Delete a share granted to the caller
#[utoipa::path(
    delete,
    path = "/shared-files/{id}/",
    tag = "shared-files",
    params(
        ("id" = Uuid, Path, description = "Share id")
    ),
    responses(
        (status = 204, description = "Share deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Share not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_shared_file(
    user: AuthenticatedUser,
    State(service): State<Arc<SharedFileService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
