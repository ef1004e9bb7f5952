use std::path::PathBuf;

use serde::Serialize;

use super::file_kind::FileKind;
use super::storage_path::StoragePath;

/// Declared identity of a file handed to the text extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub media_type: Option<String>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            media_type,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::detect(&self.name, self.media_type.as_deref())
    }
}

/// A file persisted in a chat folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    #[serde(skip)]
    pub path: StoragePath,
}

/// A file uploaded with the current request, spooled to a temporary location.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: Option<String>,
    pub path: PathBuf,
}

impl UploadedFile {
    pub fn source_file(&self) -> SourceFile {
        SourceFile::new(self.name.clone(), self.media_type.clone())
    }
}
