use std::io;

use bytes::Bytes;

use crate::domain::{ChatId, StoragePath, StoredFile};

/// Per-conversation file folders.
#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    async fn list_files(&self, chat_id: &ChatId) -> Result<Vec<StoredFile>, FileStoreError>;

    async fn save_file(
        &self,
        chat_id: &ChatId,
        name: &str,
        data: Bytes,
    ) -> Result<StoredFile, FileStoreError>;

    async fn delete_file(&self, chat_id: &ChatId, name: &str) -> Result<(), FileStoreError>;

    async fn read_file(&self, path: &StoragePath) -> Result<Vec<u8>, FileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("list failed: {0}")]
    ListFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
