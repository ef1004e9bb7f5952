use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{FileStore, FileStoreError};
use crate::domain::{ChatId, StoragePath, StoredFile, sanitize_file_name};

/// Chat folders on the local disk under `chats/<chat id>/`.
pub struct LocalFileStore {
    inner: Arc<LocalFileSystem>,
}

impl LocalFileStore {
    pub fn new(base_path: PathBuf) -> Result<Self, FileStoreError> {
        std::fs::create_dir_all(&base_path).map_err(FileStoreError::Io)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| FileStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
        })
    }

    /// The underlying object store, shared with other blob owners under the same root.
    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        self.inner.clone()
    }

    fn file_path(chat_id: &ChatId, name: &str) -> Result<(String, StoragePath), FileStoreError> {
        let name =
            sanitize_file_name(name).ok_or_else(|| FileStoreError::InvalidName(name.to_string()))?;
        let path = StoragePath::chat_file(chat_id, &name);
        Ok((name, path))
    }

    /// Logical paths hold raw names; object_store percent-encodes each segment once here.
    fn store_path(path: &StoragePath) -> StorePath {
        StorePath::from(path.as_str())
    }
}

#[async_trait::async_trait]
impl FileStore for LocalFileStore {
    async fn list_files(&self, chat_id: &ChatId) -> Result<Vec<StoredFile>, FileStoreError> {
        let prefix = StorePath::from(StoragePath::chat_folder(chat_id).as_str());
        let mut listing = self.inner.list(Some(&prefix));
        let mut files = Vec::new();

        while let Some(entry) = listing.next().await {
            let meta = match entry {
                Ok(meta) => meta,
                Err(object_store::Error::NotFound { .. }) => break,
                Err(e) => return Err(FileStoreError::ListFailed(e.to_string())),
            };

            let Some(encoded) = meta.location.filename() else {
                continue;
            };
            let name = match urlencoding::decode(encoded) {
                Ok(name) => name.into_owned(),
                Err(e) => {
                    tracing::warn!(file = %encoded, error = %e, "Skipping undecodable chat file name");
                    continue;
                }
            };

            files.push(StoredFile {
                path: StoragePath::chat_file(chat_id, &name),
                size: meta.size as u64,
                name,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn save_file(
        &self,
        chat_id: &ChatId,
        name: &str,
        data: Bytes,
    ) -> Result<StoredFile, FileStoreError> {
        let (name, path) = Self::file_path(chat_id, name)?;
        let size = data.len() as u64;

        self.inner
            .put(&Self::store_path(&path), PutPayload::from(data))
            .await
            .map_err(|e| FileStoreError::WriteFailed(e.to_string()))?;

        tracing::debug!(chat_id = %chat_id, file = %name, size, "Chat file saved");

        Ok(StoredFile { name, size, path })
    }

    async fn delete_file(&self, chat_id: &ChatId, name: &str) -> Result<(), FileStoreError> {
        let (_, path) = Self::file_path(chat_id, name)?;

        let store_path = Self::store_path(&path);
        match self.inner.delete(&store_path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(FileStoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(FileStoreError::DeleteFailed(e.to_string())),
        }
    }

    async fn read_file(&self, path: &StoragePath) -> Result<Vec<u8>, FileStoreError> {
        let store_path = Self::store_path(path);
        let result = self.inner.get(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FileStoreError::NotFound(path.to_string()),
            other => FileStoreError::ReadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| FileStoreError::ReadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
