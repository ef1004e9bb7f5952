use async_trait::async_trait;

use crate::domain::SourceFile;

#[async_trait]
pub trait FileLoader: Send + Sync {
    async fn extract_text(&self, data: &[u8], file: &SourceFile)
    -> Result<String, FileLoaderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FileLoaderError {
    #[error("unsupported file kind: {0}")]
    UnsupportedKind(String),
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    #[error("no text found in {0}")]
    NoTextFound(String),
    #[error("binary content in {0}")]
    BinaryContent(String),
}
