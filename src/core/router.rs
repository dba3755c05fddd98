//! Service wiring and the HTTP router

use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::{AuthConfig, Config, StorageBackend, StorageConfig};
use crate::core::error::Result;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::repositories::{TokenBlacklistRepository, UserRepository};
use crate::features::auth::{routes as auth_routes, AuthService, PasswordHasher, TokenService};
use crate::features::files::repositories::FileRepository;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::folders::repositories::FolderRepository;
use crate::features::folders::{routes as folders_routes, FolderService};
use crate::features::shared_files::repositories::SharedFileRepository;
use crate::features::shared_files::{routes as shared_files_routes, SharedFileService};
use crate::modules::storage::ObjectStorage;

/// Persistence backends the services are built on
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub token_blacklist: Arc<dyn TokenBlacklistRepository>,
    pub folders: Arc<dyn FolderRepository>,
    pub files: Arc<dyn FileRepository>,
    pub shared_files: Arc<dyn SharedFileRepository>,
}

/// Shared services injected as router state
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub folders: Arc<FolderService>,
    pub files: Arc<FileService>,
    pub shared_files: Arc<SharedFileService>,
}

impl AppServices {
    pub fn build(
        repositories: Repositories,
        storage: Arc<dyn ObjectStorage>,
        auth_config: &AuthConfig,
    ) -> Result<Self> {
        let token_service = Arc::new(TokenService::new(auth_config));
        let hasher = PasswordHasher::new(
            auth_config.argon2_memory_kib,
            auth_config.argon2_iterations,
        )?;

        let auth = Arc::new(AuthService::new(
            Arc::clone(&repositories.users),
            Arc::clone(&repositories.token_blacklist),
            token_service,
            hasher,
        ));
        let folders = Arc::new(FolderService::new(
            Arc::clone(&repositories.folders),
            Arc::clone(&repositories.files),
            Arc::clone(&storage),
        ));
        let files = Arc::new(FileService::new(
            Arc::clone(&repositories.files),
            Arc::clone(&repositories.folders),
            Arc::clone(&storage),
        ));
        let shared_files = Arc::new(SharedFileService::new(
            Arc::clone(&repositories.shared_files),
            Arc::clone(&repositories.files),
        ));

        Ok(Self {
            auth,
            folders,
            files,
            shared_files,
        })
    }
}

/// Simple health check endpoint (no auth required)
async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

/// Payloads kept on the local backend are served from the media root under `media_url`
fn media_routes(storage: &StorageConfig) -> Router {
    if storage.backend != StorageBackend::Local {
        return Router::new();
    }

    if !storage.media_url.starts_with('/') {
        tracing::info!(
            "MEDIA_URL '{}' is not a local path, media is expected to be served elsewhere",
            storage.media_url
        );
        return Router::new();
    }

    tracing::info!(
        "Serving {} from {}",
        storage.media_url,
        storage.media_root.display()
    );
    Router::new().nest_service(&storage.media_url, ServeDir::new(&storage.media_root))
}

pub fn create_router(services: AppServices, config: &Config) -> Router {
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require a bearer access token)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(folders_routes(Arc::clone(&services.folders)))
        .merge(files_routes(
            Arc::clone(&services.files),
            config.app.max_request_body_size,
        ))
        .merge(shared_files_routes(Arc::clone(&services.shared_files)))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&services.auth),
            middleware::auth_middleware,
        ));

    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new().merge(auth_routes::public_routes(services.auth));

    Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .merge(media_routes(&config.storage))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use crate::modules::storage::LocalStorage;
    use crate::shared::test_helpers::{test_config, TestApp};
    use axum::http::{header, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new();
        app.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = TestApp::new();
        let response = app.server.get("/health").await;
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = TestApp::new();
        let response = app.server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let doc: Value = response.json();
        assert_eq!(doc["info"]["title"], "File Vault API");
        assert!(doc["paths"]["/files/{id}/"].is_object());
    }

    #[tokio::test]
    async fn test_swagger_basic_auth_when_configured() {
        let mut config = test_config();
        config.swagger.username = Some("docs".to_string());
        config.swagger.password = Some("secret".to_string());
        let app = TestApp::with_config(config);

        app.server
            .get("/api-docs/openapi.json")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // base64("docs:secret")
        app.server
            .get("/api-docs/openapi.json")
            .add_header(header::AUTHORIZATION, "Basic ZG9jczpzZWNyZXQ=")
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_shared_file_scenario() {
        let app = TestApp::new();
        let a = app.register("user_a").await;
        let b = app.register("user_b").await;
        let folder = app.create_folder(&a, "F").await;
        let x = app.create_file(&a, folder, "X", "contents").await;

        app.server
            .post("/shared-files/")
            .authorization_bearer(&b.access_token)
            .json(&json!({ "file": x, "permission": "read_only" }))
            .await
            .assert_status(StatusCode::CREATED);

        let b_shares: Value = app
            .server
            .get("/shared-files/")
            .authorization_bearer(&b.access_token)
            .await
            .json();
        assert_eq!(b_shares["data"].as_array().map(|s| s.len()), Some(1));
        assert_eq!(b_shares["data"][0]["file"], x.to_string());

        let a_files: Value = app
            .server
            .get("/files/")
            .authorization_bearer(&a.access_token)
            .await
            .json();
        assert_eq!(a_files["data"][0]["id"], x.to_string());

        let b_files: Value = app
            .server
            .get("/files/")
            .authorization_bearer(&b.access_token)
            .await
            .json();
        assert_eq!(b_files["data"], json!([]));
    }

    #[tokio::test]
    async fn test_deleting_folder_hides_its_files() {
        let app = TestApp::new();
        let a = app.register("user_a").await;
        let folder = app.create_folder(&a, "F").await;
        let x = app.create_file(&a, folder, "X", "contents").await;

        app.server
            .delete(&format!("/folders/{}/", folder))
            .authorization_bearer(&a.access_token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.server
            .get(&format!("/files/{}/", x))
            .authorization_bearer(&a.access_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_local_payload_is_downloadable_from_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.storage.media_root = dir.path().to_path_buf();
        let storage = Arc::new(LocalStorage::new(
            dir.path().to_path_buf(),
            config.storage.media_url.clone(),
        ));
        let app = TestApp::with_storage(config, storage);

        let a = app.register("user_a").await;
        let folder = app.create_folder(&a, "F").await;
        let x = app.create_file(&a, folder, "X", "hello").await;

        let body: Value = app
            .server
            .get(&format!("/files/{}/", x))
            .authorization_bearer(&a.access_token)
            .await
            .json();
        let url = body["data"]["file"].as_str().unwrap();
        assert!(url.starts_with(&format!("/media/files/{}/", a.id)));

        let download = app.server.get(url).await;
        download.assert_status_ok();
        assert_eq!(download.text(), "hello");

        app.server
            .delete(&format!("/files/{}/", x))
            .authorization_bearer(&a.access_token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.server
            .get(url)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
