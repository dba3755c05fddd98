pub mod auth;
pub mod files;
pub mod folders;
pub mod shared_files;
