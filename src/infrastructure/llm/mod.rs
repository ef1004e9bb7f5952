mod sse_decoder;
mod streaming_client;
mod wire_format;

pub use sse_decoder::{SseDecoder, SseFrame};
pub use streaming_client::{StreamingLlmClient, create_streaming_llm_client};
pub use wire_format::{normalize_frame, parse_chat_completion_frame, parse_responses_frame};
