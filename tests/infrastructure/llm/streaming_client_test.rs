use axum::Router;
use axum::extract::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use mycoder::application::ports::{ComposedPrompt, LlmClient, LlmClientError, UpstreamEvent};
use mycoder::infrastructure::llm::create_streaming_llm_client;
use mycoder::presentation::config::LlmSettings;
use mycoder::presentation::WireFormat;

const CHAT_STREAM: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
    ": ping\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
    "data: [DONE]\n\n",
);

const RESPONSES_STREAM: &str = concat!(
    "event: response.created\ndata: {\"type\":\"response.created\"}\n\n",
    "event: response.output_text.delta\ndata: {\"delta\":\"Hel\"}\n\n",
    "event: response.output_text.delta\ndata: {\"delta\":\"lo\"}\n\n",
    "event: response.completed\ndata: {\"type\":\"response.completed\"}\n\n",
);

fn event_stream(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn chat_completions(headers: HeaderMap, Json(request): Json<Value>) -> Response {
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, "missing key").into_response();
    }
    if request["messages"][0]["role"] != "system" || request["max_tokens"] != 300 {
        return (StatusCode::BAD_REQUEST, "unexpected request").into_response();
    }
    if request["stream"] == true {
        event_stream(CHAT_STREAM)
    } else {
        Json(json!({"choices": [{"message": {"content": "whole answer"}}]})).into_response()
    }
}

async fn responses(Json(request): Json<Value>) -> Response {
    if request["instructions"] != "system" || request["max_output_tokens"] != 300 {
        return (StatusCode::BAD_REQUEST, "unexpected request").into_response();
    }
    if request["stream"] == true {
        event_stream(RESPONSES_STREAM)
    } else {
        Json(json!({
            "output": [{"content": [
                {"type": "output_text", "text": "whole "},
                {"type": "output_text", "text": "answer"}
            ]}]
        }))
        .into_response()
    }
}

async fn overloaded() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response()
}

async fn rate_limited() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
}

async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn settings(base_url: String, wire_format: WireFormat) -> LlmSettings {
    LlmSettings {
        provider: "lmstudio".to_string(),
        api_key: "sk-test".to_string(),
        base_url: Some(base_url),
        azure_endpoint: None,
        chat_model: "local-model".to_string(),
        wire_format,
        temperature: 0.2,
        sse_keep_alive_seconds: 15,
        first_delta_timeout_seconds: 5,
    }
}

fn prompt() -> ComposedPrompt {
    ComposedPrompt {
        system_text: "system".to_string(),
        user_text: "user".to_string(),
    }
}

async fn streamed_text(client: &impl LlmClient) -> Vec<UpstreamEvent> {
    client
        .complete_stream(&prompt(), 300)
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await
}

fn deltas(events: &[UpstreamEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            UpstreamEvent::DeltaText(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn given_chat_completions_upstream_when_streaming_then_yields_deltas_and_completion() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(chat_completions))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::ChatCompletions)).unwrap();

    let events = streamed_text(&client).await;

    assert_eq!(deltas(&events), vec!["Hel", "lo"]);
    assert_eq!(events.last(), Some(&UpstreamEvent::Completed));
}

#[tokio::test]
async fn given_responses_upstream_when_streaming_then_yields_same_deltas() {
    let base = spawn_upstream(Router::new().route("/responses", post(responses))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::Responses)).unwrap();

    let events = streamed_text(&client).await;

    assert_eq!(deltas(&events), vec!["Hel", "lo"]);
    assert_eq!(events.last(), Some(&UpstreamEvent::Completed));
}

#[tokio::test]
async fn given_chat_completions_upstream_when_completing_then_returns_message() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(chat_completions))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::ChatCompletions)).unwrap();

    let text = client.complete(&prompt(), 300).await.unwrap();

    assert_eq!(text, "whole answer");
}

#[tokio::test]
async fn given_responses_upstream_when_completing_then_concatenates_output_text() {
    let base = spawn_upstream(Router::new().route("/responses", post(responses))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::Responses)).unwrap();

    let text = client.complete(&prompt(), 300).await.unwrap();

    assert_eq!(text, "whole answer");
}

#[tokio::test]
async fn given_non_success_status_when_streaming_then_upstream_error_carries_status() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(overloaded))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::ChatCompletions)).unwrap();

    let result = client.complete_stream(&prompt(), 300).await;

    match result {
        Err(LlmClientError::Upstream { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "try later");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected an upstream error"),
    }
}

#[tokio::test]
async fn given_too_many_requests_when_completing_then_rate_limited() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(rate_limited))).await;
    let client = create_streaming_llm_client(&settings(base, WireFormat::ChatCompletions)).unwrap();

    let result = client.complete(&prompt(), 300).await;

    assert!(matches!(result, Err(LlmClientError::RateLimited)));
}

#[test]
fn given_lmstudio_without_base_url_when_creating_client_then_not_configured() {
    let mut settings = settings(String::new(), WireFormat::ChatCompletions);
    settings.base_url = None;

    let result = create_streaming_llm_client(&settings);

    assert!(matches!(result, Err(LlmClientError::NotConfigured(_))));
}

#[test]
fn given_unknown_provider_when_creating_client_then_not_configured() {
    let mut settings = settings("http://localhost".to_string(), WireFormat::ChatCompletions);
    settings.provider = "carrier-pigeon".to_string();

    let result = create_streaming_llm_client(&settings);

    assert!(matches!(result, Err(LlmClientError::NotConfigured(_))));
}
