pub mod file_handler;

pub use file_handler::{
    __path_create_file, __path_delete_file, __path_get_file, __path_list_files,
    __path_update_file, create_file, delete_file, get_file, list_files, update_file,
};
