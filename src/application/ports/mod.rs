mod file_loader;
mod file_store;
mod library_store;
mod llm_client;

pub use file_loader::{FileLoader, FileLoaderError};
pub use file_store::{FileStore, FileStoreError};
pub use library_store::{LibraryStore, LibraryStoreError};
pub use llm_client::{ComposedPrompt, LlmClient, LlmClientError, UpstreamEvent, UpstreamEventStream};
