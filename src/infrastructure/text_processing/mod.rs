mod docx_adapter;
mod pdf_adapter;
mod plain_text_adapter;
mod text_extractor;
mod text_sanitizer;

pub use docx_adapter::DocxAdapter;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::{BestEffortTextAdapter, PlainTextAdapter};
pub use text_extractor::TextExtractor;
pub use text_sanitizer::sanitize_extracted_text;
