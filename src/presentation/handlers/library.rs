use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::domain::{LibraryEntry, sanitize_file_name};
use crate::presentation::state::AppState;

use super::error_response::error_response;

const DEFAULT_COLLECTION: &str = "default";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub added: usize,
    pub items: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub id: String,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub ok: bool,
    pub item: LibraryEntry,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[tracing::instrument(skip(state))]
pub async fn list_library_handler<L>(State(state): State<AppState<L>>) -> Response
where
    L: LlmClient + 'static,
{
    match state.library_store.list_entries().await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list library");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list library")
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_library_handler<L>(
    State(state): State<AppState<L>>,
    mut multipart: Multipart,
) -> Response
where
    L: LlmClient + 'static,
{
    let mut collection = DEFAULT_COLLECTION.to_string();
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read multipart: {}", e),
                );
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == "collection" {
            match field.text().await {
                Ok(value) if !value.trim().is_empty() => collection = value.trim().to_string(),
                Ok(_) => {}
                Err(e) => {
                    return error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read collection: {}", e),
                    );
                }
            }
            continue;
        }
        if name != "files" && name != "files[]" {
            continue;
        }

        let Some(file_name) = sanitize_file_name(field.file_name().unwrap_or_default()) else {
            continue;
        };
        match field.bytes().await {
            Ok(data) => files.push((file_name, data)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read file bytes");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                );
            }
        }
    }

    let mut items = Vec::with_capacity(files.len());
    for (file_name, data) in files {
        match state
            .library_store
            .add(&file_name, &collection, data)
            .await
        {
            Ok(entry) => items.push(entry),
            Err(e) => {
                tracing::error!(error = %e, file = %file_name, "Library upload failed");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed");
            }
        }
    }

    tracing::info!(added = items.len(), collection = %collection, "Library upload stored");

    (
        StatusCode::OK,
        Json(UploadResponse {
            ok: true,
            added: items.len(),
            items,
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state, request), fields(id = %request.id, pinned = request.pinned))]
pub async fn pin_library_handler<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<PinRequest>,
) -> Response
where
    L: LlmClient + 'static,
{
    match state
        .library_store
        .set_pinned(&request.id, request.pinned)
        .await
    {
        Ok(Some(item)) => (StatusCode::OK, Json(PinResponse { ok: true, item })).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to update pin");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update pin")
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_library_handler<L>(
    State(state): State<AppState<L>>,
    Path(id): Path<String>,
) -> Response
where
    L: LlmClient + 'static,
{
    match state.library_store.delete(&id).await {
        Ok(true) => (StatusCode::OK, Json(OkResponse { ok: true })).into_response(),
        Ok(false) => error_response(StatusCode::NOT_FOUND, "Not found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete library entry");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete entry")
        }
    }
}
