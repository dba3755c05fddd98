pub mod folder_handler;

pub use folder_handler::{
    __path_create_folder, __path_delete_folder, __path_get_folder, __path_list_folders,
    __path_update_folder, create_folder, delete_folder, get_folder, list_folders, update_folder,
};
