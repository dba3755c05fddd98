use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, RefreshTokenRequestDto, RefreshTokenResponseDto,
    RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// Register a new user
#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error or username taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    dto.validate()?;

    let auth_response = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(auth_response), None, None)),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<ApiResponse<AuthResponseDto>>> {
    dto.validate()?;

    let auth_response = service.login(dto).await?;
    Ok(Json(ApiResponse::success(Some(auth_response), None, None)))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/token/refresh/",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 200, description = "Token refreshed", body = ApiResponse<RefreshTokenResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Refresh token invalid, expired or blacklisted")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RefreshTokenRequestDto>,
) -> Result<Json<ApiResponse<RefreshTokenResponseDto>>> {
    dto.validate()?;

    let response = service.refresh(&dto.refresh).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Blacklist a refresh token
///
/// Any failure (missing body, bad token, already blacklisted) yields the same 400.
#[utoipa::path(
    post,
    path = "/logout/",
    request_body = RefreshTokenRequestDto,
    responses(
        (status = 205, description = "Refresh token blacklisted"),
        (status = 400, description = "Logout failed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
    body: Bytes,
) -> Response {
    let result = async {
        let dto: RefreshTokenRequestDto = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid logout body: {}", e)))?;
        dto.validate()?;
        service.logout(&dto.refresh).await
    }
    .await;

    match result {
        Ok(()) => StatusCode::RESET_CONTENT.into_response(),
        Err(e) => {
            tracing::error!("Error during logout for user {}: {}", user.id, e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    Some("Invalid or expired refresh token".to_string()),
                    None,
                )),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::features::auth::model::BlacklistEntry;
    use crate::features::auth::repositories::TokenBlacklistRepository;
    use crate::shared::test_helpers::{TestApp, TEST_PASSWORD};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_register_returns_token_pair() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/register/")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 300);
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert!(body["data"]["access_token"].as_str().is_some());
        assert!(body["data"]["refresh_token"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_username() {
        let app = TestApp::new();
        app.register("alice").await;

        let response = app
            .server
            .post("/register/")
            .json(&json!({
                "username": "alice",
                "email": "other@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"][0]
            .as_str()
            .unwrap()
            .contains("already exists"));
    }

    #[tokio::test]
    async fn test_register_reports_field_errors() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/register/")
            .json(&json!({
                "username": "bad name",
                "email": "nope",
                "password": "short",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"].as_array().map(|e| e.len()), Some(3));
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_json() {
        let app = TestApp::new();

        let response = app
            .server
            .post("/register/")
            .content_type("application/json")
            .text("{not json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_success_and_indistinguishable_failures() {
        let app = TestApp::new();
        app.register("alice").await;

        let ok = app
            .server
            .post("/login/")
            .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
            .await;
        ok.assert_status_ok();
        let body: Value = ok.json();
        assert!(body["data"]["access_token"].as_str().is_some());

        let wrong_password = app
            .server
            .post("/login/")
            .json(&json!({ "username": "alice", "password": "not-the-password" }))
            .await;
        let unknown_user = app
            .server
            .post("/login/")
            .json(&json!({ "username": "nobody", "password": TEST_PASSWORD }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);
        let a: Value = wrong_password.json();
        let b: Value = unknown_user.json();
        assert_eq!(a["message"], b["message"]);
    }

    #[tokio::test]
    async fn test_refresh_mints_usable_access_token() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        let response = app
            .server
            .post("/token/refresh/")
            .json(&json!({ "refresh": alice.refresh_token }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let access = body["data"]["access_token"].as_str().unwrap().to_string();

        app.server
            .get("/folders/")
            .authorization_bearer(&access)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        app.server
            .post("/token/refresh/")
            .json(&json!({ "refresh_token": alice.access_token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // and the refresh token does not authenticate requests
        app.server
            .get("/folders/")
            .authorization_bearer(&alice.refresh_token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_blacklists_refresh_token() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        let response = app
            .server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "refresh": alice.refresh_token }))
            .await;
        response.assert_status(StatusCode::RESET_CONTENT);
        assert!(response.as_bytes().is_empty());
        assert_eq!(app.store.blacklist_count(), 1);

        app.server
            .post("/token/refresh/")
            .json(&json!({ "refresh": alice.refresh_token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        // a second logout with the same token fails
        app.server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "refresh": alice.refresh_token }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_purges_expired_blacklist_entries() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        let stale = BlacklistEntry {
            jti: Uuid::new_v4(),
            user_id: alice.id,
            expires_at: Utc::now() - Duration::hours(1),
        };
        let live = BlacklistEntry {
            jti: Uuid::new_v4(),
            user_id: alice.id,
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(app.store.blacklist(stale).await.unwrap());
        assert!(app.store.blacklist(live.clone()).await.unwrap());

        app.server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "refresh": alice.refresh_token }))
            .await
            .assert_status(StatusCode::RESET_CONTENT);

        // the stale entry is gone, the live one and the new one remain
        assert_eq!(app.store.blacklist_count(), 2);
        assert!(app.store.is_blacklisted(live.jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_failures_collapse_to_one_response() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        let missing_body = app
            .server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .await;
        let garbage_token = app
            .server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "refresh": "garbage" }))
            .await;
        let access_as_refresh = app
            .server
            .post("/logout/")
            .authorization_bearer(&alice.access_token)
            .json(&json!({ "refresh": alice.access_token }))
            .await;

        for response in [missing_body, garbage_token, access_as_refresh] {
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["message"], "Invalid or expired refresh token");
        }
        assert_eq!(app.store.blacklist_count(), 0);
    }

    #[tokio::test]
    async fn test_logout_requires_bearer_token() {
        let app = TestApp::new();
        let alice = app.register("alice").await;

        app.server
            .post("/logout/")
            .json(&json!({ "refresh": alice.refresh_token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
