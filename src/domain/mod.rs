mod chat_id;
mod context_bundle;
mod context_part;
mod delta_event;
mod file_kind;
mod library_entry;
mod request_parameters;
mod source_file;
mod storage_path;

pub use chat_id::{ChatId, ChatIdError, sanitize_file_name};
pub use context_bundle::ContextBundle;
pub use context_part::{ContextPart, ContextSource};
pub use delta_event::DeltaEvent;
pub use file_kind::FileKind;
pub use library_entry::LibraryEntry;
pub use request_parameters::{Depth, Mode, ModelRequestParameters, SourceFlags};
pub use source_file::{SourceFile, StoredFile, UploadedFile};
pub use storage_path::StoragePath;
