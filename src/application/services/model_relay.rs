use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    ComposedPrompt, LlmClient, LlmClientError, UpstreamEvent, UpstreamEventStream,
};
use crate::domain::DeltaEvent;

/// How a streaming exchange ended. The caller emits the terminal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Streamed { chars: usize },
    FellBack { chars: usize },
    Failed,
    Cancelled,
}

enum PumpEnd {
    Drained,
    Failed,
    Cancelled,
}

pub struct ModelRelay<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    first_delta_timeout: Duration,
}

impl<L> ModelRelay<L>
where
    L: LlmClient,
{
    pub fn new(llm_client: Arc<L>, first_delta_timeout: Duration) -> Self {
        Self {
            llm_client,
            first_delta_timeout,
        }
    }

    pub async fn complete(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
    ) -> Result<String, LlmClientError> {
        self.llm_client.complete(prompt, max_output_tokens).await
    }

    /// Relays upstream text into `sink` as `Delta`/`Error` events.
    ///
    /// Falls back to one non-streaming call when the stream ends without any
    /// non-blank text. Cancellation aborts the upstream request and is never
    /// reported as an error.
    #[tracing::instrument(skip_all, fields(max_output_tokens = max_output_tokens))]
    pub async fn stream(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
        sink: &mpsc::Sender<DeltaEvent>,
        cancel: &CancellationToken,
    ) -> RelayOutcome {
        let watchdog = Instant::now() + self.first_delta_timeout;
        let mut accumulated = String::new();

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return RelayOutcome::Cancelled,
            opened = tokio::time::timeout_at(
                watchdog,
                self.llm_client.complete_stream(prompt, max_output_tokens),
            ) => opened,
        };

        match opened {
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.first_delta_timeout.as_secs(),
                    "Upstream did not open before first-delta deadline"
                );
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Upstream stream request failed");
                let _ = sink.send(DeltaEvent::Error(e.to_string())).await;
                return RelayOutcome::Failed;
            }
            Ok(Ok(stream)) => {
                match Self::pump(stream, watchdog, &mut accumulated, sink, cancel).await {
                    PumpEnd::Drained => {}
                    PumpEnd::Failed => return RelayOutcome::Failed,
                    PumpEnd::Cancelled => return RelayOutcome::Cancelled,
                }
            }
        }

        if cancel.is_cancelled() {
            return RelayOutcome::Cancelled;
        }

        if !accumulated.trim().is_empty() {
            let chars = accumulated.chars().count();
            tracing::info!(chars, "Stream relayed");
            return RelayOutcome::Streamed { chars };
        }

        self.fall_back(prompt, max_output_tokens, sink, cancel)
            .await
    }

    async fn pump(
        mut stream: UpstreamEventStream,
        watchdog: Instant,
        accumulated: &mut String,
        sink: &mpsc::Sender<DeltaEvent>,
        cancel: &CancellationToken,
    ) -> PumpEnd {
        let mut sent = 0;
        loop {
            let waiting_for_first = accumulated.trim().is_empty();

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return PumpEnd::Cancelled,
                _ = tokio::time::sleep_until(watchdog), if waiting_for_first => {
                    tracing::warn!("No delta before first-delta deadline, aborting upstream");
                    return PumpEnd::Drained;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(UpstreamEvent::DeltaText(text))) => {
                    if text.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&text);
                    // Leading whitespace is held back until real text arrives.
                    if accumulated.trim().is_empty() {
                        continue;
                    }
                    let delta = accumulated[sent..].to_string();
                    sent = accumulated.len();
                    if sink.send(DeltaEvent::Delta(delta)).await.is_err() {
                        return PumpEnd::Cancelled;
                    }
                }
                Some(Ok(UpstreamEvent::Error(message))) => {
                    tracing::error!(error = %message, "Upstream reported a stream error");
                    let _ = sink.send(DeltaEvent::Error(message)).await;
                    return PumpEnd::Failed;
                }
                Some(Ok(UpstreamEvent::Completed)) | None => return PumpEnd::Drained,
                Some(Ok(UpstreamEvent::Ignorable)) => {}
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Upstream stream broke");
                    let _ = sink.send(DeltaEvent::Error(e.to_string())).await;
                    return PumpEnd::Failed;
                }
            }
        }
    }

    async fn fall_back(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
        sink: &mpsc::Sender<DeltaEvent>,
        cancel: &CancellationToken,
    ) -> RelayOutcome {
        tracing::info!("Stream produced no text, issuing non-streaming fallback");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return RelayOutcome::Cancelled,
            result = self.llm_client.complete(prompt, max_output_tokens) => result,
        };

        match result {
            Ok(text) => {
                let chars = text.chars().count();
                if !text.is_empty() && sink.send(DeltaEvent::Delta(text)).await.is_err() {
                    return RelayOutcome::Cancelled;
                }
                RelayOutcome::FellBack { chars }
            }
            Err(e) => {
                tracing::error!(error = %e, "Fallback completion failed");
                let _ = sink.send(DeltaEvent::Error(e.to_string())).await;
                RelayOutcome::Failed
            }
        }
    }
}
