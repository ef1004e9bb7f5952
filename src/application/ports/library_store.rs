use bytes::Bytes;

use crate::domain::LibraryEntry;

/// Process-wide index of reusable documents.
///
/// Implementations own their concurrency discipline; callers issue small,
/// independent operations and tolerate last-write-wins on pin races.
#[async_trait::async_trait]
pub trait LibraryStore: Send + Sync {
    async fn list_entries(&self) -> Result<Vec<LibraryEntry>, LibraryStoreError>;

    async fn get(&self, id: &str) -> Result<Option<LibraryEntry>, LibraryStoreError>;

    async fn add(
        &self,
        filename: &str,
        collection: &str,
        data: Bytes,
    ) -> Result<LibraryEntry, LibraryStoreError>;

    async fn set_pinned(
        &self,
        id: &str,
        pinned: bool,
    ) -> Result<Option<LibraryEntry>, LibraryStoreError>;

    async fn delete(&self, id: &str) -> Result<bool, LibraryStoreError>;

    /// Bytes behind an entry; `None` when the blob is gone.
    async fn read_content(&self, entry: &LibraryEntry) -> Result<Option<Vec<u8>>, LibraryStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryStoreError {
    #[error("index unreadable: {0}")]
    IndexCorrupted(String),
    #[error("blob storage failed: {0}")]
    Blob(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
