use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::folders::dtos::{CreateFolderDto, FolderResponseDto, UpdateFolderDto};
use crate::features::folders::services::FolderService;
use crate::shared::types::ApiResponse;

/// List the caller's folders
#[utoipa::path(
    get,
    path = "/folders/",
    tag = "folders",
    responses(
        (status = 200, description = "Folders owned by the caller", body = ApiResponse<Vec<FolderResponseDto>>),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_folders(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
) -> Result<Json<ApiResponse<Vec<FolderResponseDto>>>> {
    let folders = service.list(&user).await?;
    Ok(Json(ApiResponse::list(folders)))
}

/// Create a folder
#[utoipa::path(
    post,
    path = "/folders/",
    tag = "folders",
    request_body = CreateFolderDto,
    responses(
        (status = 201, description = "Folder created", body = ApiResponse<FolderResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppJson(dto): AppJson<CreateFolderDto>,
) -> Result<(StatusCode, Json<ApiResponse<FolderResponseDto>>)> {
    let dto = dto.normalized();
    dto.validate()?;

    let folder = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(folder),
            Some("Folder created successfully".to_string()),
            None,
        )),
    ))
}

/// Get one of the caller's folders
#[utoipa::path(
    get,
    path = "/folders/{id}/",
    tag = "folders",
    params(
        ("id" = Uuid, Path, description = "Folder id")
    ),
    responses(
        (status = 200, description = "Folder found", body = ApiResponse<FolderResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    let folder = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(folder), None, None)))
}

/// Update one of the caller's folders
#[utoipa::path(
    put,
    path = "/folders/{id}/",
    tag = "folders",
    params(
        ("id" = Uuid, Path, description = "Folder id")
    ),
    request_body = UpdateFolderDto,
    responses(
        (status = 200, description = "Folder updated", body = ApiResponse<FolderResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateFolderDto>,
) -> Result<Json<ApiResponse<FolderResponseDto>>> {
    let dto = dto.normalized();
    dto.validate()?;

    let folder = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(folder), None, None)))
}

/// Delete one of the caller's folders and every file in it
#[utoipa::path(
    delete,
    path = "/folders/{id}/",
    tag = "folders",
    params(
        ("id" = Uuid, Path, description = "Folder id")
    ),
    responses(
        (status = 204, description = "Folder deleted"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Folder not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_folder(
    user: AuthenticatedUser,
    State(service): State<Arc<FolderService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode> {
    service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::TestApp;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_forces_owner_to_caller() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let bob = app.register("bob").await;

        let response = app
            .server
            .post("/folders/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "name": "Reports", "owner": bob.id }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["owner"], alice.id.to_string());
        assert_eq!(body["data"]["name"], "Reports");
        assert_eq!(body["data"]["files"], json!([]));
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        let too_long = "x".repeat(101);
        for name in ["", "   ", too_long.as_str()] {
            app.server
                .post("/folders/")
                .authorization_bearer(&alice.access_token)
                .json(&json!({ "name": name }))
                .await
                .assert_status(StatusCode::BAD_REQUEST);
        }

        app.server
            .post("/folders/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.store.folder_count(), 0);
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_ordered() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let bob = app.register("bob").await;

        let first = app.create_folder(&alice, "first").await;
        app.create_folder(&bob, "bobs").await;
        let second = app.create_folder(&alice, "second").await;

        let response = app
            .server
            .get("/folders/")
            .authorization_bearer(&alice.access_token)
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"][0]["id"], first.to_string());
        assert_eq!(body["data"][1]["id"], second.to_string());
    }

    #[tokio::test]
    async fn test_folder_embeds_its_files() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let folder = app.create_folder(&alice, "docs").await;
        let file = app.create_file(&alice, folder, "notes", "hello").await;

        let body: Value = app
            .server
            .get(&format!("/folders/{}/", folder))
            .authorization_bearer(&alice.access_token)
            .await
            .json();

        assert_eq!(body["data"]["files"][0]["id"], file.to_string());
        assert_eq!(body["data"]["files"][0]["name"], "notes");
    }

    #[tokio::test]
    async fn test_foreign_folder_is_not_found() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let bob = app.register("bob").await;
        let folder = app.create_folder(&alice, "private").await;
        let path = format!("/folders/{}/", folder);

        let foreign = app
            .server
            .get(&path)
            .authorization_bearer(&bob.access_token)
            .await;
        let missing = app
            .server
            .get(&format!("/folders/{}/", Uuid::now_v7()))
            .authorization_bearer(&bob.access_token)
            .await;

        foreign.assert_status(StatusCode::NOT_FOUND);
        missing.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(foreign.json::<Value>(), missing.json::<Value>());

        app.server
            .put(&path)
            .authorization_bearer(&bob.access_token)
            .json(&json!({ "name": "stolen" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .delete(&path)
            .authorization_bearer(&bob.access_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        assert_eq!(app.store.folder_count(), 1);
    }

    #[tokio::test]
    async fn test_update_renames_and_keeps_owner() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let bob = app.register("bob").await;
        let folder = app.create_folder(&alice, "old").await;

        let response = app
            .server
            .put(&format!("/folders/{}/", folder))
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "name": "new", "owner": bob.id }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["name"], "new");
        assert_eq!(body["data"]["owner"], alice.id.to_string());

        let patched: Value = app
            .server
            .patch(&format!("/folders/{}/", folder))
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "name": "newer" }))
            .await
            .json();
        assert_eq!(patched["data"]["name"], "newer");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_files_and_payloads() {
        let app = TestApp::new();
        let alice = app.register("alice").await;
        let folder = app.create_folder(&alice, "doomed").await;
        let file = app.create_file(&alice, folder, "a", "aaa").await;
        app.create_file(&alice, folder, "b", "bbb").await;
        assert_eq!(app.storage.object_count(), 2);

        let response = app
            .server
            .delete(&format!("/folders/{}/", folder))
            .authorization_bearer(&alice.access_token)
            .await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.as_bytes().is_empty());

        assert_eq!(app.store.file_count(), 0);
        assert_eq!(app.storage.object_count(), 0);
        app.server
            .get(&format!("/files/{}/", file))
            .authorization_bearer(&alice.access_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        app.server
            .get("/folders/not-a-uuid/")
            .authorization_bearer(&alice.access_token)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_requires_authentication() {
        let app = TestApp::new();

        app.server
            .get("/folders/")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        app.server
            .get("/folders/")
            .authorization_bearer("not-a-token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
