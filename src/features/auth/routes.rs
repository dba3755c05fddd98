use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{routing::post, Router};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/register/", post(handlers::register))
        .route("/login/", post(handlers::login))
        .route("/token/refresh/", post(handlers::refresh_token))
        .with_state(service)
}

/// Protected auth routes (require JWT authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/logout/", post(handlers::logout))
        .with_state(service)
}
