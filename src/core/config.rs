use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Settings for locally issued JWTs and password hashing
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub jwt_leeway: Duration,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    /// Argon2 time cost (iterations)
    pub argon2_iterations: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("jwt_leeway", &self.jwt_leeway)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .finish()
    }
}

/// Which object storage keeps uploaded file payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    MinIO,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory that receives uploads when the local backend is active
    pub media_root: PathBuf,
    /// URL prefix used to build references for locally stored payloads
    pub media_url: String,
    pub minio: MinIOConfig,
}

/// MinIO/S3 storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Presigned URL expiry time in seconds
    pub presigned_url_expiry_secs: u32,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 300; // 5 minutes
    const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 86400; // 1 day
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 0;
    const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19456;
    const DEFAULT_ARGON2_ITERATIONS: u32 = 2;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable is required".to_string())?;

        if jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        let access_token_ttl_secs = env::var("JWT_ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACCESS_TOKEN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_ACCESS_TOKEN_TTL_SECS must be a valid number".to_string())?;

        let refresh_token_ttl_secs = env::var("JWT_REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REFRESH_TOKEN_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_REFRESH_TOKEN_TTL_SECS must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        let argon2_memory_kib = env::var("ARGON2_MEMORY_KIB")
            .unwrap_or_else(|_| Self::DEFAULT_ARGON2_MEMORY_KIB.to_string())
            .parse::<u32>()
            .map_err(|_| "ARGON2_MEMORY_KIB must be a valid number".to_string())?;

        let argon2_iterations = env::var("ARGON2_ITERATIONS")
            .unwrap_or_else(|_| Self::DEFAULT_ARGON2_ITERATIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "ARGON2_ITERATIONS must be a valid number".to_string())?;

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::from_secs(access_token_ttl_secs),
            refresh_token_ttl: Duration::from_secs(refresh_token_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
            argon2_memory_kib,
            argon2_iterations,
        })
    }
}

impl StorageBackend {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "minio" | "s3" => Ok(Self::MinIO),
            other => Err(format!(
                "STORAGE_BACKEND must be 'local' or 'minio', got '{}'",
                other
            )),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let backend =
            StorageBackend::parse(&env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".into()))?;

        let media_root = env::var("MEDIA_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./media"));

        let media_url = env::var("MEDIA_URL")
            .unwrap_or_else(|_| "/media".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            backend,
            media_root,
            media_url,
            minio: MinIOConfig::from_env()?,
        })
    }
}

impl MinIOConfig {
    const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "file-vault".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let presigned_url_expiry_secs = env::var("MINIO_PRESIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PRESIGNED_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "MINIO_PRESIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            presigned_url_expiry_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "File Vault API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for File Vault".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
