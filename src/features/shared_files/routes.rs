use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::shared_files::handlers;
use crate::features::shared_files::services::SharedFileService;

/// Create routes for the shared-files feature
pub fn routes(service: Arc<SharedFileService>) -> Router {
    Router::new()
        .route(
            "/shared-files/",
            get(handlers::list_shared_files).post(handlers::create_shared_file),
        )
        .route(
            "/shared-files/{id}/",
            get(handlers::get_shared_file)
                .put(handlers::update_shared_file)
                .patch(handlers::update_shared_file)
                .delete(handlers::delete_shared_file),
        )
        .with_state(service)
}
