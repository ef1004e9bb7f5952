use mycoder::application::ports::UpstreamEvent;
use mycoder::infrastructure::llm::{
    SseDecoder, SseFrame, normalize_frame, parse_chat_completion_frame, parse_responses_frame,
};
use mycoder::presentation::WireFormat;

fn frame(event: Option<&str>, data: &str) -> SseFrame {
    SseFrame {
        event: event.map(str::to_string),
        data: data.to_string(),
    }
}

fn deltas(format: WireFormat, body: &str) -> Vec<String> {
    let mut decoder = SseDecoder::new();
    decoder
        .push(body.as_bytes())
        .iter()
        .map(|f| normalize_frame(format, f))
        .filter_map(|event| match event {
            UpstreamEvent::DeltaText(text) => Some(text),
            _ => None,
        })
        .collect()
}

#[test]
fn given_chat_completion_delta_when_parsing_then_returns_text() {
    let event = parse_chat_completion_frame(&frame(
        None,
        r#"{"choices":[{"delta":{"content":"Hello"}}]}"#,
    ));

    assert_eq!(event, UpstreamEvent::DeltaText("Hello".to_string()));
}

#[test]
fn given_done_sentinel_when_parsing_chat_completion_then_returns_completed() {
    assert_eq!(
        parse_chat_completion_frame(&frame(None, "[DONE]")),
        UpstreamEvent::Completed
    );
}

#[test]
fn given_role_only_or_malformed_chunk_when_parsing_then_ignorable() {
    let role_only =
        parse_chat_completion_frame(&frame(None, r#"{"choices":[{"delta":{"role":"assistant"}}]}"#));
    let malformed = parse_chat_completion_frame(&frame(None, "not json"));

    assert_eq!(role_only, UpstreamEvent::Ignorable);
    assert_eq!(malformed, UpstreamEvent::Ignorable);
}

#[test]
fn given_error_object_in_chat_stream_when_parsing_then_returns_error_message() {
    let event = parse_chat_completion_frame(&frame(
        None,
        r#"{"error":{"message":"context length exceeded"}}"#,
    ));

    assert_eq!(
        event,
        UpstreamEvent::Error("context length exceeded".to_string())
    );
}

#[test]
fn given_named_delta_event_when_parsing_responses_then_returns_text() {
    let event = parse_responses_frame(&frame(
        Some("response.output_text.delta"),
        r#"{"type":"response.output_text.delta","delta":"Hi"}"#,
    ));

    assert_eq!(event, UpstreamEvent::DeltaText("Hi".to_string()));
}

#[test]
fn given_error_and_failed_events_when_parsing_responses_then_returns_errors() {
    let error = parse_responses_frame(&frame(Some("error"), r#"{"message":"bad key"}"#));
    let failed = parse_responses_frame(&frame(
        Some("response.failed"),
        r#"{"response":{"error":{"message":"overloaded"}}}"#,
    ));

    assert_eq!(error, UpstreamEvent::Error("bad key".to_string()));
    assert_eq!(failed, UpstreamEvent::Error("overloaded".to_string()));
}

#[test]
fn given_completed_and_other_events_when_parsing_responses_then_informational_only() {
    let completed = parse_responses_frame(&frame(Some("response.completed"), "{}"));
    let created = parse_responses_frame(&frame(Some("response.created"), "{}"));

    assert_eq!(completed, UpstreamEvent::Completed);
    assert_eq!(created, UpstreamEvent::Ignorable);
}

#[test]
fn given_equivalent_streams_in_both_formats_when_normalizing_then_same_deltas() {
    let chat = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"fn \"}}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"add\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"()\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    let responses = concat!(
        "event: response.created\ndata: {\"type\":\"response.created\"}\n\n",
        "event: response.output_text.delta\ndata: {\"delta\":\"fn \"}\n\n",
        "event: response.output_text.delta\ndata: {\"delta\":\"add\"}\n\n",
        "event: response.output_text.delta\ndata: {\"delta\":\"()\"}\n\n",
        "event: response.completed\ndata: {\"type\":\"response.completed\"}\n\n",
    );

    let from_chat = deltas(WireFormat::ChatCompletions, chat);
    let from_responses = deltas(WireFormat::Responses, responses);

    assert_eq!(from_chat, vec!["fn ", "add", "()"]);
    assert_eq!(from_chat, from_responses);
}
