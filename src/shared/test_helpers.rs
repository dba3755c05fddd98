//! In-memory backends and a router-level test server
//!
//! `MemoryStore` implements every repository trait with the same cascade
//! rules as the database schema, so tests drive the real router without
//! Postgres.

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::{
    AppConfig, AuthConfig, Config, DatabaseConfig, MinIOConfig, StorageBackend, StorageConfig,
    SwaggerConfig,
};
use crate::core::error::{AppError, Result};
use crate::core::router::{create_router, AppServices, Repositories};
use crate::features::auth::model::{BlacklistEntry, NewUser, User};
use crate::features::auth::repositories::{
    TokenBlacklistRepository, UserRepository, DUPLICATE_USERNAME,
};
use crate::features::files::models::{File, FileChanges, NewFile};
use crate::features::files::repositories::FileRepository;
use crate::features::folders::models::{Folder, NewFolder};
use crate::features::folders::repositories::FolderRepository;
use crate::features::shared_files::models::{NewSharedFile, SharedFile, SharedFileChanges};
use crate::features::shared_files::repositories::SharedFileRepository;
use crate::modules::storage::ObjectStorage;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    blacklist: Vec<BlacklistEntry>,
    folders: Vec<Folder>,
    files: Vec<File>,
    shares: Vec<SharedFile>,
}

/// Vec-backed store; rows stay in insertion order
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn folder_count(&self) -> usize {
        self.tables().folders.len()
    }

    pub fn file_count(&self) -> usize {
        self.tables().files.len()
    }

    pub fn share_count(&self) -> usize {
        self.tables().shares.len()
    }

    pub fn blacklist_count(&self) -> usize {
        self.tables().blacklist.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables();
        if tables.users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::Validation(DUPLICATE_USERNAME.to_string()));
        }

        let user = User {
            id: Uuid::now_v7(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl TokenBlacklistRepository for MemoryStore {
    async fn blacklist(&self, entry: BlacklistEntry) -> Result<bool> {
        let mut tables = self.tables();
        if tables.blacklist.iter().any(|e| e.jti == entry.jti) {
            return Ok(false);
        }
        tables.blacklist.push(entry);
        Ok(true)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool> {
        Ok(self.tables().blacklist.iter().any(|e| e.jti == jti))
    }

    async fn purge_expired(&self, cutoff: chrono::DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables();
        let before = tables.blacklist.len();
        tables.blacklist.retain(|e| e.expires_at >= cutoff);
        Ok((before - tables.blacklist.len()) as u64)
    }
}

#[async_trait]
impl FolderRepository for MemoryStore {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Folder>> {
        Ok(self
            .tables()
            .folders
            .iter()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>> {
        Ok(self.tables().folders.iter().find(|f| f.id == id).cloned())
    }

    async fn create(&self, folder: NewFolder) -> Result<Folder> {
        let folder = Folder {
            id: Uuid::now_v7(),
            name: folder.name,
            owner_id: folder.owner_id,
            created_at: Utc::now(),
        };
        self.tables().folders.push(folder.clone());
        Ok(folder)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Folder> {
        let mut tables = self.tables();
        let folder = tables
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound("Folder not found".to_string()))?;
        folder.name = name.to_string();
        Ok(folder.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables();
        let removed_files: Vec<Uuid> = tables
            .files
            .iter()
            .filter(|f| f.folder_id == id)
            .map(|f| f.id)
            .collect();

        tables.folders.retain(|f| f.id != id);
        tables.files.retain(|f| f.folder_id != id);
        tables.shares.retain(|s| !removed_files.contains(&s.file_id));
        Ok(())
    }
}

#[async_trait]
impl FileRepository for MemoryStore {
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<File>> {
        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_folders(&self, folder_ids: &[Uuid]) -> Result<Vec<File>> {
        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| folder_ids.contains(&f.folder_id))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<File>> {
        Ok(self.tables().files.iter().find(|f| f.id == id).cloned())
    }

    async fn create(&self, file: NewFile) -> Result<File> {
        let mut tables = self.tables();
        if !tables.folders.iter().any(|f| f.id == file.folder_id) {
            return Err(AppError::Internal("folder foreign key violated".to_string()));
        }

        let file = File {
            id: Uuid::now_v7(),
            file_key: file.file_key,
            name: file.name,
            folder_id: file.folder_id,
            owner_id: file.owner_id,
            created_at: Utc::now(),
        };
        tables.files.push(file.clone());
        Ok(file)
    }

    async fn update(&self, id: Uuid, changes: FileChanges) -> Result<File> {
        let mut tables = self.tables();
        let file = tables
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;

        if let Some(file_key) = changes.file_key {
            file.file_key = file_key;
        }
        if let Some(name) = changes.name {
            file.name = name;
        }
        if let Some(folder_id) = changes.folder_id {
            file.folder_id = folder_id;
        }
        Ok(file.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables();
        tables.files.retain(|f| f.id != id);
        tables.shares.retain(|s| s.file_id != id);
        Ok(())
    }
}

#[async_trait]
impl SharedFileRepository for MemoryStore {
    async fn list_by_recipient(&self, user_id: Uuid) -> Result<Vec<SharedFile>> {
        Ok(self
            .tables()
            .shares
            .iter()
            .filter(|s| s.shared_with_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SharedFile>> {
        Ok(self.tables().shares.iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, share: NewSharedFile) -> Result<SharedFile> {
        let share = SharedFile {
            id: Uuid::now_v7(),
            file_id: share.file_id,
            shared_with_id: share.shared_with_id,
            permission: share.permission,
            created_at: Utc::now(),
        };
        self.tables().shares.push(share.clone());
        Ok(share)
    }

    async fn update(&self, id: Uuid, changes: SharedFileChanges) -> Result<SharedFile> {
        let mut tables = self.tables();
        let share = tables
            .shares
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound("Shared file not found".to_string()))?;

        if let Some(file_id) = changes.file_id {
            share.file_id = file_id;
        }
        if let Some(permission) = changes.permission {
            share.permission = permission;
        }
        Ok(share.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.tables().shares.retain(|s| s.id != id);
        Ok(())
    }
}

/// Object storage kept in a map, keyed like the real backends
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    fn objects(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects().len()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        self.objects().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects().remove(key);
        Ok(())
    }

    async fn file_url(&self, key: &str) -> Result<String> {
        Ok(format!("memory://{}", key))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-for-testing-only-0123456789".to_string(),
        access_token_ttl: Duration::from_secs(300),
        refresh_token_ttl: Duration::from_secs(86400),
        jwt_leeway: Duration::ZERO,
        // cheap hashing keeps the suite fast
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
    }
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 1024 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 1,
            max_lifetime_secs: 1,
        },
        auth: test_auth_config(),
        storage: StorageConfig {
            backend: StorageBackend::Local,
            media_root: PathBuf::from("./media"),
            media_url: "/media".to_string(),
            minio: MinIOConfig {
                endpoint: "http://localhost:9000".to_string(),
                access_key: "minioadmin".to_string(),
                secret_key: "minioadmin".to_string(),
                bucket: "file-vault".to_string(),
                region: "us-east-1".to_string(),
                presigned_url_expiry_secs: 3600,
            },
        },
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "File Vault API".to_string(),
            version: "0.1.0".to_string(),
            description: "API documentation for File Vault".to_string(),
        },
    }
}

/// The real router over an in-memory store and the given object storage
pub struct TestApp<S = MemoryStorage> {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<S>,
}

/// Tokens and id of a freshly registered user
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_storage(config, Arc::new(MemoryStorage::default()))
    }
}

impl<S: ObjectStorage + 'static> TestApp<S> {
    pub fn with_storage(config: Config, storage: Arc<S>) -> Self {
        let store = Arc::new(MemoryStore::default());

        let repositories = Repositories {
            users: store.clone(),
            token_blacklist: store.clone(),
            folders: store.clone(),
            files: store.clone(),
            shared_files: store.clone(),
        };
        let services = AppServices::build(repositories, storage.clone(), &config.auth)
            .expect("services");
        let server = TestServer::new(create_router(services, &config)).expect("test server");

        Self {
            server,
            store,
            storage,
        }
    }

    pub async fn register(&self, username: &str) -> TestUser {
        let email: String = SafeEmail().fake();
        let response = self
            .server
            .post("/register/")
            .json(&json!({
                "username": username,
                "email": email,
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        TestUser {
            id: body["data"]["user"]["id"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .expect("user id"),
            username: username.to_string(),
            access_token: body["data"]["access_token"]
                .as_str()
                .expect("access token")
                .to_string(),
            refresh_token: body["data"]["refresh_token"]
                .as_str()
                .expect("refresh token")
                .to_string(),
        }
    }

    /// Create a folder as `user` and return its id
    pub async fn create_folder(&self, user: &TestUser, name: &str) -> Uuid {
        let response = self
            .server
            .post("/folders/")
            .authorization_bearer(&user.access_token)
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        data_id(&response.json())
    }

    /// Upload a text file into `folder` as `user` and return its id
    pub async fn create_file(&self, user: &TestUser, folder: Uuid, name: &str, content: &str) -> Uuid {
        let response = self
            .server
            .post("/files/")
            .authorization_bearer(&user.access_token)
            .multipart(upload_form(Some(folder), Some(name), Some(content)))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        data_id(&response.json())
    }
}

/// Multipart body with whichever of the three parts are given
pub fn upload_form(
    folder: Option<Uuid>,
    name: Option<&str>,
    content: Option<&str>,
) -> axum_test::multipart::MultipartForm {
    use axum_test::multipart::{MultipartForm, Part};

    let mut form = MultipartForm::new();
    if let Some(content) = content {
        form = form.add_part(
            "file",
            Part::bytes(content.as_bytes().to_vec())
                .file_name(format!("{}.txt", name.unwrap_or("upload")))
                .mime_type("text/plain"),
        );
    }
    if let Some(name) = name {
        form = form.add_text("name", name.to_string());
    }
    if let Some(folder) = folder {
        form = form.add_text("folder", folder.to_string());
    }
    form
}

pub fn data_id(body: &Value) -> Uuid {
    body["data"]["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("data.id")
}
