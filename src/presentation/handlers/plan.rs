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
pub struct PlanResponse {
    pub ok: bool,
    pub plan: Plan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub requirements: Vec<String>,
    pub steps: Vec<String>,
    pub dir_tree: Vec<String>,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Serialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: ContextSource,
    pub name: String,
}

const REQUIREMENTS: [&str; 3] = [
    "Parse the assignment to extract tasks",
    "Reference slides and starter code first",
    "Generate code per file in the requested style",
];

const STEPS: [&str; 3] = [
    "Build a structured plan (directory tree, types, functions)",
    "Retrieve the most relevant snippets from uploads, chat files and library",
    "Generate code, check it against the style profile, retry if needed",
];

/// Static work plan citing the uploaded files. Makes no model call.
#[tracing::instrument(skip(state, multipart))]
pub async fn plan_handler<L>(State(state): State<AppState<L>>, multipart: Multipart) -> Response
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
            tracing::warn!(error = %e, "Invalid plan form");
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let citations = form
        .uploads
        .iter()
        .map(|upload| Citation {
            kind: ContextSource::Upload,
            name: upload.upload().name.clone(),
        })
        .collect();

    let plan = Plan {
        requirements: REQUIREMENTS.iter().map(|s| s.to_string()).collect(),
        steps: STEPS.iter().map(|s| s.to_string()).collect(),
        dir_tree: vec!["src/".to_string()],
        citations,
    };

    (StatusCode::OK, Json(PlanResponse { ok: true, plan })).into_response()
}
