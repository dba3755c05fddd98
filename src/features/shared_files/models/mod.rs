pub mod shared_file;

pub use shared_file::*;
