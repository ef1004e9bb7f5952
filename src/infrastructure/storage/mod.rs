mod json_library_store;
mod local_file_store;
mod temp_upload;

pub use json_library_store::JsonLibraryStore;
pub use local_file_store::LocalFileStore;
pub use temp_upload::TempUpload;
