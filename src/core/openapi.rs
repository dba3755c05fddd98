use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::folders::{dtos as folders_dtos, handlers as folders_handlers};
use crate::features::shared_files::{dtos as shared_files_dtos, handlers as shared_files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::refresh_token,
        // Folders
        folders_handlers::list_folders,
        folders_handlers::create_folder,
        folders_handlers::get_folder,
        folders_handlers::update_folder,
        folders_handlers::delete_folder,
        // Files
        files_handlers::list_files,
        files_handlers::create_file,
        files_handlers::get_file,
        files_handlers::update_file,
        files_handlers::delete_file,
        // Shared files
        shared_files_handlers::list_shared_files,
        shared_files_handlers::create_shared_file,
        shared_files_handlers::get_shared_file,
        shared_files_handlers::update_shared_file,
        shared_files_handlers::delete_shared_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenRequestDto,
            auth::dtos::RefreshTokenResponseDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::RefreshTokenResponseDto>,
            // Folders
            folders_dtos::CreateFolderDto,
            folders_dtos::UpdateFolderDto,
            folders_dtos::FolderResponseDto,
            ApiResponse<folders_dtos::FolderResponseDto>,
            ApiResponse<Vec<folders_dtos::FolderResponseDto>>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::UpdateFileDto,
            files_dtos::FileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            ApiResponse<Vec<files_dtos::FileResponseDto>>,
            // Shared files
            shared_files_dtos::PermissionDto,
            shared_files_dtos::CreateSharedFileDto,
            shared_files_dtos::UpdateSharedFileDto,
            shared_files_dtos::SharedFileResponseDto,
            ApiResponse<shared_files_dtos::SharedFileResponseDto>,
            ApiResponse<Vec<shared_files_dtos::SharedFileResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login, logout and token refresh"),
        (name = "folders", description = "Folders owned by the caller"),
        (name = "files", description = "Files owned by the caller"),
        (name = "shared-files", description = "File shares granted to the caller"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "File Vault API",
        version = "0.1.0",
        description = "API documentation for File Vault",
    )
)]
pub struct ApiDoc;

/// Security scheme for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
