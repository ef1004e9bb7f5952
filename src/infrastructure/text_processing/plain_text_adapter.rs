use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{FileKind, SourceFile};

const BINARY_SNIFF_LEN: usize = 8192;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// UTF-8 decode for files known to be text; invalid sequences become U+FFFD.
pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        file: &SourceFile,
    ) -> Result<String, FileLoaderError> {
        if file.kind() != FileKind::Text {
            return Err(FileLoaderError::UnsupportedKind(file.kind().as_str().to_string()));
        }

        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        match std::str::from_utf8(data) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => {
                tracing::debug!(filename = %file.name, error = %e, "Replacing invalid UTF-8 sequences");
                Ok(String::from_utf8_lossy(data).into_owned())
            }
        }
    }
}

/// Lossy decode for anything without a dedicated adapter. Rejects obvious binaries.
pub struct BestEffortTextAdapter;

#[async_trait]
impl FileLoader for BestEffortTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        file: &SourceFile,
    ) -> Result<String, FileLoaderError> {
        let head = &data[..data.len().min(BINARY_SNIFF_LEN)];
        if head.contains(&0) {
            return Err(FileLoaderError::BinaryContent(file.name.clone()));
        }

        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}
