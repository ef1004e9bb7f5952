use std::sync::Arc;

use axum::response::sse::Event;
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ComposedPrompt, LlmClient};
use crate::application::services::ModelRelay;
use crate::domain::DeltaEvent;

use super::meta_snapshot::MetaSnapshot;

pub const DONE_MARKER: &str = "[DONE]";

const RELAY_CHANNEL_CAPACITY: usize = 64;

/// One event on the outbound channel of a streaming ask.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Meta(MetaSnapshot),
    Delta(String),
    Error(String),
    Done,
}

#[derive(Serialize)]
struct MetaPayload<'a> {
    meta: &'a MetaSnapshot,
}

#[derive(Serialize)]
struct DeltaPayload<'a> {
    delta: &'a str,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

impl TransportEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The `data:` body written for this event.
    pub fn data(&self) -> String {
        match self {
            Self::Meta(meta) => serde_json::to_string(&MetaPayload { meta }).unwrap_or_default(),
            Self::Delta(delta) => {
                serde_json::to_string(&DeltaPayload { delta }).unwrap_or_default()
            }
            Self::Error(error) => {
                serde_json::to_string(&ErrorPayload { error }).unwrap_or_default()
            }
            Self::Done => DONE_MARKER.to_string(),
        }
    }

    pub fn into_sse(self) -> Event {
        Event::default().data(self.data())
    }
}

/// Runs the relay for one request and yields its events in wire order:
/// meta, deltas, at most one error, then exactly one `Done`.
///
/// `resources` lives exactly as long as the stream. Dropping the stream
/// (client gone) cancels the relay and releases them.
pub fn relay_events<L, R>(
    relay: Arc<ModelRelay<L>>,
    prompt: ComposedPrompt,
    max_output_tokens: u32,
    meta: MetaSnapshot,
    resources: R,
) -> impl Stream<Item = TransportEvent> + Send + 'static
where
    L: LlmClient + 'static,
    R: Send + 'static,
{
    let cancel = CancellationToken::new();
    let relay_cancel = cancel.clone();

    async_stream::stream! {
        let _cancel_on_drop = cancel.drop_guard();
        let _resources = resources;

        yield TransportEvent::Meta(meta);

        let (sink, mut deltas) = mpsc::channel::<DeltaEvent>(RELAY_CHANNEL_CAPACITY);
        let relay_task = tokio::spawn(async move {
            relay
                .stream(&prompt, max_output_tokens, &sink, &relay_cancel)
                .await
        });

        let mut errored = false;
        while let Some(event) = deltas.recv().await {
            match event {
                DeltaEvent::Delta(text) => {
                    yield TransportEvent::Delta(text);
                }
                DeltaEvent::Error(message) => {
                    if !errored {
                        errored = true;
                        yield TransportEvent::Error(message);
                    }
                }
            }
        }
        drop(deltas);

        match relay_task.await {
            Ok(outcome) => tracing::info!(?outcome, "Relay finished"),
            Err(e) => {
                tracing::error!(error = %e, "Relay task aborted");
                if !errored {
                    yield TransportEvent::Error("Streaming failed".to_string());
                }
            }
        }

        yield TransportEvent::Done;
    }
}
