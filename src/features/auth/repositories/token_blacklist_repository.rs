use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::BlacklistEntry;

#[async_trait]
pub trait TokenBlacklistRepository: Send + Sync {
    /// Record a refresh token as revoked. Returns false if it already was.
    async fn blacklist(&self, entry: BlacklistEntry) -> Result<bool>;

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool>;

    /// Drop entries whose token expired before `cutoff`. Returns how many were removed.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

pub struct PgTokenBlacklistRepository {
    pool: PgPool,
}

impl PgTokenBlacklistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklistRepository for PgTokenBlacklistRepository {
    async fn blacklist(&self, entry: BlacklistEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO token_blacklist (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(entry.jti)
        .bind(entry.user_id)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to blacklist token: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_blacklisted(&self, jti: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE jti = $1)",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check token blacklist: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(exists)
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge token blacklist: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }
}
