//! HS256 access and refresh token issuing and validation

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{TokenClaims, TokenKind, User};

/// Freshly minted access/refresh pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    leeway: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl: config.access_token_ttl,
            refresh_token_ttl: config.refresh_token_ttl,
            leeway: config.jwt_leeway,
        }
    }

    /// Tokens that expired before this instant fail validation even with leeway
    pub fn expired_before(&self) -> DateTime<Utc> {
        let leeway =
            chrono::Duration::from_std(self.leeway).unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() - leeway
    }

    /// Access token lifetime in seconds, as reported to clients
    pub fn access_expires_in(&self) -> i64 {
        self.access_token_ttl.as_secs() as i64
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access(user.id, &user.username)?,
            refresh_token: self.issue(user.id, &user.username, TokenKind::Refresh)?,
            expires_in: self.access_expires_in(),
        })
    }

    pub fn issue_access(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.issue(user_id, username, TokenKind::Access)
    }

    fn issue(&self, user_id: Uuid, username: &str, kind: TokenKind) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        };
        let now = Utc::now().timestamp();

        let claims = TokenClaims {
            sub: user_id,
            username: username.to_string(),
            token_type: kind,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, and that the token is of the expected kind
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway.as_secs();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                AppError::Auth("Token is invalid or expired".to_string())
            })?
            .claims;

        if claims.token_type != expected {
            return Err(AppError::Auth("Token has wrong type".to_string()));
        }

        Ok(claims)
    }
}

impl TokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
