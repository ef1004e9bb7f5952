use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::ports::{FileStoreError, LlmClient};
use crate::domain::ChatId;
use crate::presentation::state::AppState;

use super::error_response::error_response;
use super::library::OkResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    pub chat_id: String,
}

#[tracing::instrument(skip(state))]
pub async fn list_chat_files_handler<L>(
    State(state): State<AppState<L>>,
    Query(query): Query<ChatQuery>,
) -> Response
where
    L: LlmClient + 'static,
{
    let chat_id = match ChatId::parse(&query.chat_id) {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid chatId: {}", e)),
    };

    match state.file_store.list_files(&chat_id).await {
        Ok(files) => (StatusCode::OK, Json(files)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, chat_id = %chat_id, "Failed to list chat files");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list chat files")
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_chat_file_handler<L>(
    State(state): State<AppState<L>>,
    Path(name): Path<String>,
    Query(query): Query<ChatQuery>,
) -> Response
where
    L: LlmClient + 'static,
{
    let chat_id = match ChatId::parse(&query.chat_id) {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, format!("Invalid chatId: {}", e)),
    };

    match state.file_store.delete_file(&chat_id, &name).await {
        Ok(()) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Err(FileStoreError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, "Not found"),
        Err(FileStoreError::InvalidName(name)) => {
            error_response(StatusCode::BAD_REQUEST, format!("Invalid file name: {}", name))
        }
        Err(e) => {
            tracing::error!(error = %e, chat_id = %chat_id, "Failed to delete chat file");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete chat file")
        }
    }
}
