pub mod shared_file_service;

pub use shared_file_service::SharedFileService;
