use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::folders::handlers;
use crate::features::folders::services::FolderService;

/// Create routes for the folders feature
pub fn routes(service: Arc<FolderService>) -> Router {
    Router::new()
        .route(
            "/folders/",
            get(handlers::list_folders).post(handlers::create_folder),
        )
        .route(
            "/folders/{id}/",
            get(handlers::get_folder)
                .put(handlers::update_folder)
                .patch(handlers::update_folder)
                .delete(handlers::delete_folder),
        )
        .with_state(service)
}
