mod shared_file_repository;

pub use shared_file_repository::{PgSharedFileRepository, SharedFileRepository};
