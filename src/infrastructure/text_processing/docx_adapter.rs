use std::io::{Cursor, Read};

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{FileKind, SourceFile};

use super::text_sanitizer::sanitize_extracted_text;

const DOCUMENT_PART: &str = "word/document.xml";

/// Pulls run text out of an OOXML word-processing package.
#[derive(Default)]
pub struct DocxAdapter;

impl DocxAdapter {
    pub fn new() -> Self {
        Self
    }

    fn read_document_part(data: &[u8]) -> Result<String, FileLoaderError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("not a docx package: {e}")))?;

        let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("missing {DOCUMENT_PART}: {e}"))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("unreadable {DOCUMENT_PART}: {e}")))?;

        Ok(xml)
    }

    fn document_text(xml: &str) -> Result<String, FileLoaderError> {
        let mut reader = Reader::from_str(xml);
        let mut text = String::new();
        let mut inside_run_text = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => inside_run_text = true,
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => inside_run_text = false,
                    b"w:p" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"w:tab" => text.push('\t'),
                    b"w:br" | b"w:cr" => text.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if inside_run_text => {
                    let unescaped = t.unescape().map_err(|e| {
                        FileLoaderError::ExtractionFailed(format!("bad text node: {e}"))
                    })?;
                    text.push_str(&unescaped);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(FileLoaderError::ExtractionFailed(format!(
                        "malformed document xml at {}: {e}",
                        reader.buffer_position()
                    )));
                }
                _ => {}
            }
        }

        Ok(text)
    }

    fn extract(data: &[u8]) -> Result<String, FileLoaderError> {
        let xml = Self::read_document_part(data)?;
        Self::document_text(&xml)
    }
}

#[async_trait]
impl FileLoader for DocxAdapter {
    #[tracing::instrument(skip(self, data), fields(filename = %file.name, bytes = data.len()))]
    async fn extract_text(
        &self,
        data: &[u8],
        file: &SourceFile,
    ) -> Result<String, FileLoaderError> {
        if file.kind() != FileKind::Docx {
            return Err(FileLoaderError::UnsupportedKind(file.kind().as_str().to_string()));
        }

        let owned = data.to_vec();
        let raw = tokio::task::spawn_blocking(move || Self::extract(&owned))
            .await
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("task join error: {e}")))??;

        let text = sanitize_extracted_text(&raw);
        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(file.name.clone()));
        }

        Ok(text)
    }
}
