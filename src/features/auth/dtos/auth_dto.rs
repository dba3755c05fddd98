use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::User;
use crate::shared::validation::USERNAME_REGEX;

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    /// Letters, digits and @ . + - _ only
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username may contain only letters, digits and @/./+/-/_"
        )
    )]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[validate(length(
        min = 8,
        max = 128,
        message = "Password must be 8-128 characters"
    ))]
    pub password: String,
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request DTO carrying a refresh token, used by refresh and logout
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequestDto {
    #[serde(alias = "refresh_token")]
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

/// Response DTO for token refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenResponseDto {
    /// New JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiry time in seconds
    pub expires_in: i64,
}

/// Response DTO for authentication (register/login)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    pub access_token: String,
    pub refresh_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token expiry time in seconds
    pub expires_in: i64,
    pub user: AuthUserDto,
}

/// User info included in auth response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for AuthUserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
