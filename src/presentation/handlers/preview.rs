use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::domain::ContextSource;
use crate::presentation::state::AppState;

use super::ask_form::read_ask_form;
use super::error_response::error_response;

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub response: String,
}

/// Offline dry run: assembles context without calling the model or persisting uploads.
#[tracing::instrument(skip(state, multipart))]
pub async fn preview_handler<L>(State(state): State<AppState<L>>, multipart: Multipart) -> Response
where
    L: LlmClient + 'static,
{
    let form = match read_ask_form(
        multipart,
        &state.settings.context,
        &state.settings.storage.tmp_dir(),
    )
    .await
    {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid preview form");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let uploaded = form.uploaded_files();
    let bundle = state
        .context_assembler
        .assemble(&form.context_request(&uploaded, false))
        .await;

    let count = |source: ContextSource| bundle.parts.iter().filter(|p| p.source == source).count();
    let prompt = if form.params.prompt.trim().is_empty() {
        "(no text)"
    } else {
        form.params.prompt.as_str()
    };
    let style = if form.params.active_style_profile().is_some() {
        "[provided]"
    } else {
        "[none]"
    };

    let response = format!(
        "Preview of: \"{}\"\n\nStyleProfile: {}\nAttachments: {} | Chat files: {} | Library: {}\n\n(Context length preview: {} chars)",
        prompt,
        style,
        uploaded.len(),
        count(ContextSource::Chat),
        count(ContextSource::Library),
        bundle.concatenated_text.chars().count()
    );

    (StatusCode::OK, Json(PreviewResponse { response })).into_response()
}
