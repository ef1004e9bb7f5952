use std::num::IntErrorKind;
use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;

use crate::application::services::ContextRequest;
use crate::domain::{
    ChatId, ChatIdError, Depth, Mode, ModelRequestParameters, UploadedFile, sanitize_file_name,
};
use crate::infrastructure::storage::TempUpload;
use crate::presentation::config::ContextSettings;

/// Parsed multipart body shared by ask, preview and estimate requests.
///
/// Uploaded parts live in scoped temp files for as long as the form is held.
#[derive(Debug)]
pub struct AskForm {
    pub params: ModelRequestParameters,
    pub chat_id: Option<ChatId>,
    pub uploads: Vec<TempUpload>,
}

#[derive(Debug, thiserror::Error)]
pub enum AskFormError {
    #[error("failed to read multipart: {0}")]
    Multipart(#[from] MultipartError),
    #[error("invalid chatId: {0}")]
    InvalidChatId(#[from] ChatIdError),
    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("failed to spool upload: {0}")]
    Spool(#[from] std::io::Error),
}

impl AskForm {
    pub fn uploaded_files(&self) -> Vec<UploadedFile> {
        self.uploads.iter().map(|u| u.upload().clone()).collect()
    }

    pub fn context_request<'a>(
        &'a self,
        uploaded: &'a [UploadedFile],
        persist_uploads: bool,
    ) -> ContextRequest<'a> {
        ContextRequest {
            chat_id: self.chat_id.as_ref(),
            uploads: uploaded,
            sources: self.params.sources,
            pinned_ids: &self.params.pinned_ids,
            char_budget: self.params.char_budget,
            persist_uploads,
        }
    }
}

pub async fn read_ask_form(
    mut multipart: Multipart,
    limits: &ContextSettings,
    tmp_dir: &Path,
) -> Result<AskForm, AskFormError> {
    let mut params = ModelRequestParameters {
        max_output_tokens: limits.default_max_output_tokens,
        rag_k: limits.default_rag_k,
        char_budget: limits.default_char_budget,
        ..ModelRequestParameters::default()
    };
    let mut chat_id = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "files" || name == "files[]" {
            let declared = field.file_name().unwrap_or_default().to_string();
            let media_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;

            let Some(file_name) = sanitize_file_name(&declared) else {
                tracing::debug!(declared = %declared, "Skipping upload without usable name");
                continue;
            };
            if data.is_empty() {
                tracing::debug!(file = %file_name, "Skipping empty upload");
                continue;
            }

            tracing::debug!(file = %file_name, bytes = data.len(), "Upload received");
            uploads.push(TempUpload::spool(tmp_dir, file_name, media_type, data).await?);
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "prompt" => params.prompt = value,
            "chatId" => {
                if !value.trim().is_empty() {
                    chat_id = Some(ChatId::parse(&value)?);
                }
            }
            "mode" => params.mode = Mode::parse(&value),
            "depth" => params.depth = Depth::parse(&value),
            "maxTokens" => {
                if let Some(tokens) = parse_integer("maxTokens", &value)? {
                    params.max_output_tokens =
                        clamp_to(tokens, limits.min_output_tokens, limits.max_output_tokens);
                }
            }
            "critique" => params.critique = parse_flag(&value, false),
            "retrieval" => {
                if !value.trim().is_empty() {
                    params.retrieval = value.trim().to_string();
                }
            }
            "ragK" => {
                if let Some(k) = parse_integer("ragK", &value)? {
                    params.rag_k = clamp_to(k, limits.min_rag_k, limits.max_rag_k);
                }
            }
            "ragBudget" => {
                if let Some(budget) = parse_integer("ragBudget", &value)? {
                    params.char_budget = usize::try_from(budget.max(0)).unwrap_or(usize::MAX);
                }
            }
            "srcUploads" => params.sources.uploads = parse_flag(&value, true),
            "srcChat" => params.sources.chat = parse_flag(&value, true),
            "srcLibrary" => params.sources.library = parse_flag(&value, true),
            "styleProfile" => {
                if !value.trim().is_empty() {
                    params.style_profile = Some(value);
                }
            }
            "includeStyle" => params.include_style = parse_flag(&value, true),
            "pinned" => params.pinned_ids = parse_pinned(&value),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(AskForm {
        params,
        chat_id,
        uploads,
    })
}

/// Integer form value; out-of-range magnitudes saturate so the caller can clamp.
fn parse_integer(field: &'static str, raw: &str) -> Result<Option<i64>, AskFormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(Some(i64::MAX)),
            IntErrorKind::NegOverflow => Ok(Some(i64::MIN)),
            _ => Err(AskFormError::InvalidNumber {
                field,
                value: trimmed.to_string(),
            }),
        },
    }
}

fn clamp_to(value: i64, min: u32, max: u32) -> u32 {
    let clamped = value.clamp(i64::from(min), i64::from(max));
    u32::try_from(clamped).unwrap_or(max)
}

/// Checkbox-style flags; anything unrecognized keeps `default`.
pub fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => true,
        "0" | "false" | "off" | "no" => false,
        _ => default,
    }
}

/// A JSON array of library ids. Malformed input selects nothing extra.
pub fn parse_pinned(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed pinned id list");
            Vec::new()
        }
    }
}
