use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{FileKind, SourceFile};

use super::docx_adapter::DocxAdapter;
use super::pdf_adapter::PdfAdapter;
use super::plain_text_adapter::{BestEffortTextAdapter, PlainTextAdapter};

/// Dispatches to an adapter by file kind, falling back to a lossy decode.
pub struct TextExtractor {
    adapters: HashMap<FileKind, Arc<dyn FileLoader>>,
    fallback: Arc<dyn FileLoader>,
}

impl TextExtractor {
    pub fn new(
        adapters: Vec<(FileKind, Arc<dyn FileLoader>)>,
        fallback: Arc<dyn FileLoader>,
    ) -> Self {
        Self {
            adapters: adapters.into_iter().collect(),
            fallback,
        }
    }

    pub fn with_default_adapters() -> Self {
        let pdf: Arc<dyn FileLoader> = Arc::new(PdfAdapter::new());
        let docx: Arc<dyn FileLoader> = Arc::new(DocxAdapter::new());
        let text: Arc<dyn FileLoader> = Arc::new(PlainTextAdapter);

        Self::new(
            vec![
                (FileKind::Pdf, pdf),
                (FileKind::Docx, docx),
                (FileKind::Text, text),
            ],
            Arc::new(BestEffortTextAdapter),
        )
    }
}

#[async_trait]
impl FileLoader for TextExtractor {
    async fn extract_text(
        &self,
        data: &[u8],
        file: &SourceFile,
    ) -> Result<String, FileLoaderError> {
        let kind = file.kind();
        let adapter = self.adapters.get(&kind).unwrap_or(&self.fallback);

        tracing::debug!(filename = %file.name, kind = kind.as_str(), bytes = data.len(), "Extracting text");
        adapter.extract_text(data, file).await
    }
}
