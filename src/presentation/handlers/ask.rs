use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::sse::{KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Serialize;

use crate::application::ports::{ComposedPrompt, LlmClient};
use crate::application::services::compose;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::ask_form::{AskForm, read_ask_form};
use super::error_response::{error_response, not_configured};
use super::meta_snapshot::MetaSnapshot;
use super::sse_transport::relay_events;

const NO_CONTENT: &str = "(no content)";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub ai_response: String,
}

/// Assembles context for the form and composes the model prompt.
/// Uploads are persisted into the chat folder on the way.
async fn prepare<L>(state: &AppState<L>, form: &AskForm) -> (ComposedPrompt, MetaSnapshot)
where
    L: LlmClient + 'static,
{
    let uploaded = form.uploaded_files();
    let bundle = state
        .context_assembler
        .assemble(&form.context_request(&uploaded, true))
        .await;
    let prompt = compose(&form.params, &bundle);
    let meta = MetaSnapshot::new(&form.params, &bundle, &prompt);
    (prompt, meta)
}

#[tracing::instrument(skip(state, multipart))]
pub async fn ask_handler<L>(State(state): State<AppState<L>>, multipart: Multipart) -> Response
where
    L: LlmClient + 'static,
{
    if !state.settings.llm.is_configured() {
        tracing::warn!("Ask request rejected: upstream model not configured");
        return not_configured();
    }

    let form = match read_ask_form(
        multipart,
        &state.settings.context,
        &state.settings.storage.tmp_dir(),
    )
    .await
    {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid ask form");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    tracing::debug!(prompt = %sanitize_prompt(&form.params.prompt), "Processing ask");

    let (prompt, meta) = prepare(&state, &form).await;
    tracing::debug!(tokens = meta.tokens, files = meta.files.len(), "Prompt composed");

    match state
        .model_relay
        .complete(&prompt, form.params.max_output_tokens)
        .await
    {
        Ok(text) => {
            tracing::info!(chars = text.chars().count(), "Ask completed");
            let ai_response = if text.trim().is_empty() {
                NO_CONTENT.to_string()
            } else {
                text
            };
            (StatusCode::OK, Json(AskResponse { ai_response })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Ask failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Request failed: {}", e),
            )
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn ask_stream_handler<L>(
    State(state): State<AppState<L>>,
    multipart: Multipart,
) -> Response
where
    L: LlmClient + 'static,
{
    if !state.settings.llm.is_configured() {
        tracing::warn!("Streaming ask rejected: upstream model not configured");
        return not_configured();
    }

    let form = match read_ask_form(
        multipart,
        &state.settings.context,
        &state.settings.storage.tmp_dir(),
    )
    .await
    {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid ask form");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    tracing::debug!(prompt = %sanitize_prompt(&form.params.prompt), "Processing streaming ask");

    let (prompt, meta) = prepare(&state, &form).await;
    let max_output_tokens = form.params.max_output_tokens;
    let keep_alive_seconds = state.settings.llm.sse_keep_alive_seconds;

    let events = relay_events(
        Arc::clone(&state.model_relay),
        prompt,
        max_output_tokens,
        meta,
        form.uploads,
    )
    .map(|event| Ok::<_, Infallible>(event.into_sse()));

    Sse::new(events)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(keep_alive_seconds))
                .text("keep-alive"),
        )
        .into_response()
}
