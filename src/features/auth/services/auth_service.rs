use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::{AuthenticatedUser, BlacklistEntry, NewUser, TokenKind, User};
use crate::features::auth::repositories::{TokenBlacklistRepository, UserRepository};
use crate::features::auth::services::{PasswordHasher, TokenService};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";
const TOKEN_TYPE: &str = "Bearer";

/// Registration, login, token refresh/revocation and bearer-token resolution
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    blacklist: Arc<dyn TokenBlacklistRepository>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        blacklist: Arc<dyn TokenBlacklistRepository>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            blacklist,
            tokens,
            hasher,
        }
    }

    /// Create an account and sign the new user in
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let password_hash = self.hash_password(dto.password).await?;

        // A concurrent registration of the same name still fails on the unique constraint
        let user = self
            .users
            .create(NewUser {
                username: dto.username,
                email: dto.email,
                password_hash,
            })
            .await?;

        tracing::info!("User registered: {} ({})", user.username, user.id);
        self.auth_response(&user)
    }

    /// Exchange username and password for an access/refresh pair
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let Some(user) = self.users.find_by_username(&dto.username).await? else {
            tracing::debug!("Login failed: unknown username");
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        if !self
            .verify_password(dto.password, user.password_hash.clone())
            .await?
        {
            tracing::debug!("Login failed: wrong password for {}", user.id);
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        tracing::info!("User logged in: {}", user.id);
        self.auth_response(&user)
    }

    /// Mint a new access token from a live, non-blacklisted refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponseDto> {
        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;

        if self.blacklist.is_blacklisted(claims.jti).await? {
            return Err(AppError::Auth("Token is blacklisted".to_string()));
        }

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Auth("User not found".to_string()))?;

        Ok(RefreshTokenResponseDto {
            access_token: self.tokens.issue_access(user.id, &user.username)?,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.tokens.access_expires_in(),
        })
    }

    /// Blacklist a refresh token. Fails if it is invalid, expired or already revoked.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;

        let revoked = self
            .blacklist
            .blacklist(BlacklistEntry {
                jti: claims.jti,
                user_id: claims.sub,
                expires_at: claims.expires_at(),
            })
            .await?;

        if !revoked {
            return Err(AppError::BadRequest("Token is blacklisted".to_string()));
        }

        tracing::info!("Refresh token revoked for user {}", claims.sub);

        match self.blacklist.purge_expired(self.tokens.expired_before()).await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired blacklist entries", purged),
            Err(e) => tracing::warn!("Failed to purge expired blacklist entries: {}", e),
        }

        Ok(())
    }

    /// Resolve a bearer access token to the user it was issued for
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.decode(access_token, TokenKind::Access)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Auth("User not found".to_string()))?;

        Ok(AuthenticatedUser::from(&user))
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponseDto> {
        let pair = self.tokens.issue_pair(user)?;
        Ok(AuthResponseDto {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: pair.expires_in,
            user: user.into(),
        })
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, stored_hash: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}
