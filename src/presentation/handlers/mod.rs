mod ask;
mod ask_form;
mod chat_files;
mod error_response;
mod estimate;
mod health;
mod library;
mod meta_snapshot;
mod plan;
mod preview;
mod sse_transport;

pub use ask::{ask_handler, ask_stream_handler};
pub use ask_form::{AskForm, AskFormError, parse_flag, parse_pinned, read_ask_form};
pub use chat_files::{delete_chat_file_handler, list_chat_files_handler};
pub use error_response::ErrorResponse;
pub use estimate::estimate_handler;
pub use health::health_handler;
pub use library::{
    delete_library_handler, list_library_handler, pin_library_handler, upload_library_handler,
};
pub use meta_snapshot::{MetaFile, MetaSnapshot, RetrievalStats};
pub use plan::plan_handler;
pub use preview::preview_handler;
pub use sse_transport::{DONE_MARKER, TransportEvent, relay_events};
