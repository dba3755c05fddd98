pub mod shared_file_dto;

pub use shared_file_dto::*;
