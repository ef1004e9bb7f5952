use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::UpstreamEvent;
use crate::presentation::config::WireFormat;

use super::sse_decoder::SseFrame;

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ResponsesEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    response: Option<Value>,
}

pub fn normalize_frame(format: WireFormat, frame: &SseFrame) -> UpstreamEvent {
    match format {
        WireFormat::ChatCompletions => parse_chat_completion_frame(frame),
        WireFormat::Responses => parse_responses_frame(frame),
    }
}

/// `data: {"choices":[{"delta":{"content":"…"}}]}` frames ending with `data: [DONE]`.
pub fn parse_chat_completion_frame(frame: &SseFrame) -> UpstreamEvent {
    let data = frame.data.trim();
    if data == DONE_SENTINEL {
        return UpstreamEvent::Completed;
    }

    let Ok(chunk) = serde_json::from_str::<ChatCompletionChunk>(data) else {
        return UpstreamEvent::Ignorable;
    };

    if let Some(error) = chunk.error {
        return UpstreamEvent::Error(error_message(&error));
    }

    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty())
        .map(UpstreamEvent::DeltaText)
        .unwrap_or(UpstreamEvent::Ignorable)
}

/// Named-event blocks: `event: response.output_text.delta` + `data: {"delta":"…"}`.
pub fn parse_responses_frame(frame: &SseFrame) -> UpstreamEvent {
    let data = frame.data.trim();
    if data == DONE_SENTINEL {
        return UpstreamEvent::Completed;
    }

    let Ok(event) = serde_json::from_str::<ResponsesEvent>(data) else {
        return UpstreamEvent::Ignorable;
    };

    let name = frame
        .event
        .as_deref()
        .or(event.kind.as_deref())
        .unwrap_or_default();

    match name {
        "response.output_text.delta" => event
            .delta
            .filter(|delta| !delta.is_empty())
            .map(UpstreamEvent::DeltaText)
            .unwrap_or(UpstreamEvent::Ignorable),
        "error" => UpstreamEvent::Error(
            event
                .message
                .or_else(|| event.error.as_ref().map(error_message))
                .unwrap_or_else(|| "upstream stream error".to_string()),
        ),
        "response.failed" => UpstreamEvent::Error(
            event
                .response
                .as_ref()
                .and_then(|response| response.get("error"))
                .map(error_message)
                .unwrap_or_else(|| "upstream response failed".to_string()),
        ),
        "response.completed" => UpstreamEvent::Completed,
        _ => UpstreamEvent::Ignorable,
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}
