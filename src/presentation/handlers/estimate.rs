use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::application::services::{estimate_input_cost_usd, estimate_tokens};
use crate::presentation::state::AppState;

use super::ask_form::read_ask_form;
use super::error_response::error_response;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub tokens: usize,
    #[serde(rename = "inputCostUSD")]
    pub input_cost_usd: f64,
}

/// Rough input size of an ask: prompt, style profile and the untrimmed text of
/// every candidate source. Nothing is persisted.
#[tracing::instrument(skip(state, multipart))]
pub async fn estimate_handler<L>(State(state): State<AppState<L>>, multipart: Multipart) -> Response
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
            tracing::warn!(error = %e, "Invalid estimate form");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let uploaded = form.uploaded_files();
    let candidates = state
        .context_assembler
        .collect_candidates(&form.context_request(&uploaded, false))
        .await;

    let chars = form.params.prompt.chars().count()
        + form
            .params
            .style_profile
            .as_deref()
            .map_or(0, |profile| profile.chars().count())
        + candidates.total_chars();
    let tokens = estimate_tokens(chars);
    let input_cost_usd = estimate_input_cost_usd(tokens, state.settings.pricing.input_usd_per_million);

    tracing::debug!(chars, tokens, input_cost_usd, "Estimate computed");

    (
        StatusCode::OK,
        Json(EstimateResponse {
            tokens,
            input_cost_usd,
        }),
    )
        .into_response()
}
