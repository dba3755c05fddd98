//! MinIO/S3-compatible storage backend
//!
//! Payloads are kept private in the bucket; clients receive presigned
//! download URLs that expire after `presigned_url_expiry_secs`.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use super::ObjectStorage;
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    presigned_url_expiry_secs: u32,
    endpoint: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration, creating the bucket if needed
    pub async fn new(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let client = Self {
            bucket,
            region,
            credentials,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
            endpoint: config.endpoint,
        };

        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for MinIOClient {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!(
            "Deleted file '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }

    async fn file_url(&self, key: &str) -> Result<String, AppError> {
        self.bucket
            .presign_get(key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }

    fn name(&self) -> &'static str {
        "minio"
    }
}
