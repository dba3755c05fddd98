use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{NewUser, User};

/// Message reported when a username is already registered
pub const DUPLICATE_USERNAME: &str = "username: A user with that username already exists.";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken username is reported as a validation error
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Exact, case-sensitive username lookup
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, Some("users_username_key")) {
                return AppError::Validation(DUPLICATE_USERNAME.to_string());
            }
            tracing::error!("Failed to create user: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user by username: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to find user by id: {:?}", e);
            AppError::Database(e)
        })
    }
}
