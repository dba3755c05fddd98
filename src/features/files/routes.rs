use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;

use crate::features::files::handlers;
use crate::features::files::services::FileService;

/// Create routes for the files feature
///
/// Uploads may be as large as `max_body_size`.
pub fn routes(file_service: Arc<FileService>, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/files/",
            get(handlers::list_files).post(handlers::create_file),
        )
        .route(
            "/files/{id}/",
            get(handlers::get_file)
                .put(handlers::update_file)
                .patch(handlers::update_file)
                .delete(handlers::delete_file),
        )
        .layer(DefaultBodyLimit::max(max_body_size))
        .with_state(file_service)
}
