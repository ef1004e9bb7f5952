use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};
use tokio::sync::Mutex;

use crate::application::ports::{LibraryStore, LibraryStoreError};
use crate::domain::{LibraryEntry, StoragePath, sanitize_file_name};

/// Library index kept as one JSON array on disk, blobs in an object store.
///
/// Mutations run one at a time and replace the index file atomically.
pub struct JsonLibraryStore {
    index_path: PathBuf,
    blobs: Arc<dyn ObjectStore>,
    write_lock: Mutex<()>,
}

impl JsonLibraryStore {
    pub fn new(index_path: PathBuf, blobs: Arc<dyn ObjectStore>) -> Result<Self, LibraryStoreError> {
        if let Some(parent) = index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            index_path,
            blobs,
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self) -> Result<Vec<LibraryEntry>, LibraryStoreError> {
        let raw = match tokio::fs::read(&self.index_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LibraryStoreError::Io(e)),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&raw).map_err(|e| LibraryStoreError::IndexCorrupted(e.to_string()))
    }

    async fn save(&self, entries: &[LibraryEntry]) -> Result<(), LibraryStoreError> {
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| LibraryStoreError::IndexCorrupted(e.to_string()))?;
        let staging = self.index_path.with_extension("json.tmp");

        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.index_path).await?;
        Ok(())
    }

    fn blob_path(entry: &LibraryEntry) -> StorePath {
        StorePath::from(StoragePath::library_blob(&entry.stored_name).as_str())
    }
}

#[async_trait::async_trait]
impl LibraryStore for JsonLibraryStore {
    async fn list_entries(&self) -> Result<Vec<LibraryEntry>, LibraryStoreError> {
        self.load().await
    }

    async fn get(&self, id: &str) -> Result<Option<LibraryEntry>, LibraryStoreError> {
        Ok(self.load().await?.into_iter().find(|entry| entry.id == id))
    }

    async fn add(
        &self,
        filename: &str,
        collection: &str,
        data: Bytes,
    ) -> Result<LibraryEntry, LibraryStoreError> {
        let filename = sanitize_file_name(filename).unwrap_or_else(|| "unnamed".to_string());
        let entry = LibraryEntry::new(filename, data.len() as u64, collection.to_string());

        self.blobs
            .put(&Self::blob_path(&entry), PutPayload::from(data))
            .await
            .map_err(|e| LibraryStoreError::Blob(e.to_string()))?;

        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(entry.clone());
        self.save(&entries).await?;

        tracing::info!(id = %entry.id, filename = %entry.filename, size = entry.size, "Library entry added");
        Ok(entry)
    }

    async fn set_pinned(
        &self,
        id: &str,
        pinned: bool,
    ) -> Result<Option<LibraryEntry>, LibraryStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;

        let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
            return Ok(None);
        };
        entry.pinned = pinned;
        let updated = entry.clone();

        self.save(&entries).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool, LibraryStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;

        let Some(index) = entries.iter().position(|entry| entry.id == id) else {
            return Ok(false);
        };
        let removed = entries.remove(index);

        if let Err(e) = self.blobs.delete(&Self::blob_path(&removed)).await {
            tracing::warn!(error = %e, id = %removed.id, "Could not delete library blob");
        }

        self.save(&entries).await?;
        Ok(true)
    }

    async fn read_content(
        &self,
        entry: &LibraryEntry,
    ) -> Result<Option<Vec<u8>>, LibraryStoreError> {
        let result = match self.blobs.get(&Self::blob_path(entry)).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(LibraryStoreError::Blob(e.to_string())),
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| LibraryStoreError::Blob(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }
}
