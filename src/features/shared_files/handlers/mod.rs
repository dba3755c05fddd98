pub mod shared_file_handler;

pub use shared_file_handler::{
    __path_create_shared_file, __path_delete_shared_file, __path_get_shared_file,
    __path_list_shared_files, __path_update_shared_file, create_shared_file, delete_shared_file,
    get_shared_file, list_shared_files, update_shared_file,
};
