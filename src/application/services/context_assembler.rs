use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;

use crate::application::ports::{FileLoader, FileStore, LibraryStore};
use crate::domain::{
    ChatId, ContextBundle, ContextPart, ContextSource, SourceFile, SourceFlags, UploadedFile,
};

pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Inputs of one assembly pass.
#[derive(Debug, Clone)]
pub struct ContextRequest<'a> {
    pub chat_id: Option<&'a ChatId>,
    pub uploads: &'a [UploadedFile],
    pub sources: SourceFlags,
    pub pinned_ids: &'a [String],
    pub char_budget: usize,
    /// Copy uploads into the chat folder before reading the folder back.
    pub persist_uploads: bool,
}

/// Extracted, non-blank parts in priority order plus how many sources were looked at.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub parts: Vec<ContextPart>,
    pub considered: usize,
}

impl Candidates {
    pub fn total_chars(&self) -> usize {
        self.parts.iter().map(ContextPart::char_len).sum()
    }
}

pub struct ContextAssembler {
    file_store: Arc<dyn FileStore>,
    library_store: Arc<dyn LibraryStore>,
    file_loader: Arc<dyn FileLoader>,
    budget_floor: usize,
}

impl ContextAssembler {
    pub fn new(
        file_store: Arc<dyn FileStore>,
        library_store: Arc<dyn LibraryStore>,
        file_loader: Arc<dyn FileLoader>,
        budget_floor: usize,
    ) -> Self {
        Self {
            file_store,
            library_store,
            file_loader,
            budget_floor,
        }
    }

    #[tracing::instrument(
        skip(self, request),
        fields(
            chat_id = request.chat_id.map(ChatId::as_str).unwrap_or("-"),
            uploads = request.uploads.len(),
            char_budget = request.char_budget,
        )
    )]
    pub async fn assemble(&self, request: &ContextRequest<'_>) -> ContextBundle {
        let candidates = self.collect_candidates(request).await;
        let budget = self.budget_floor.max(request.char_budget);
        let bundle = fit_to_budget(candidates, budget);

        tracing::info!(
            selected = bundle.parts.len(),
            candidates = bundle.candidate_count,
            context_chars = bundle.text_chars(),
            budget,
            "Context assembled"
        );

        bundle
    }

    /// Extracts every enabled source without applying the budget.
    pub async fn collect_candidates(&self, request: &ContextRequest<'_>) -> Candidates {
        let mut candidates = Candidates::default();
        let mut persisted_now = HashSet::new();

        if request.sources.uploads {
            for upload in request.uploads {
                candidates.considered += 1;
                let data = match tokio::fs::read(&upload.path).await {
                    Ok(data) => Bytes::from(data),
                    Err(e) => {
                        tracing::warn!(error = %e, file = %upload.name, "Failed to read upload");
                        continue;
                    }
                };

                if request.persist_uploads {
                    if let Some(chat_id) = request.chat_id {
                        match self
                            .file_store
                            .save_file(chat_id, &upload.name, data.clone())
                            .await
                        {
                            Ok(stored) => {
                                persisted_now.insert(stored.name);
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, file = %upload.name, "Failed to persist upload");
                            }
                        }
                    }
                }

                let text = self.extract(&data, &upload.source_file()).await;
                push_if_readable(&mut candidates, ContextSource::Upload, &upload.name, text);
            }
        }

        if request.sources.chat {
            if let Some(chat_id) = request.chat_id {
                self.collect_chat_files(chat_id, &persisted_now, &mut candidates)
                    .await;
            }
        }

        if request.sources.library {
            self.collect_library(request.pinned_ids, &mut candidates)
                .await;
        }

        candidates
    }

    async fn collect_chat_files(
        &self,
        chat_id: &ChatId,
        skip: &HashSet<String>,
        candidates: &mut Candidates,
    ) {
        let files = match self.file_store.list_files(chat_id).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, chat_id = %chat_id, "Failed to list chat files");
                return;
            }
        };

        for file in files.into_iter().filter(|f| !skip.contains(&f.name)) {
            candidates.considered += 1;
            let data = match self.file_store.read_file(&file.path).await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(error = %e, file = %file.name, "Failed to read chat file");
                    continue;
                }
            };
            let text = self
                .extract(&data, &SourceFile::new(file.name.clone(), None))
                .await;
            push_if_readable(candidates, ContextSource::Chat, &file.name, text);
        }
    }

    async fn collect_library(&self, pinned_ids: &[String], candidates: &mut Candidates) {
        let entries = match self.library_store.list_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list library entries");
                return;
            }
        };

        for entry in entries.iter().filter(|e| e.is_selected(pinned_ids)) {
            candidates.considered += 1;
            let data = match self.library_store.read_content(entry).await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::warn!(id = %entry.id, file = %entry.filename, "Library blob missing");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, id = %entry.id, "Failed to read library entry");
                    continue;
                }
            };
            let text = self
                .extract(&data, &SourceFile::new(entry.filename.clone(), None))
                .await;
            push_if_readable(candidates, ContextSource::Library, &entry.filename, text);
        }
    }

    async fn extract(&self, data: &[u8], file: &SourceFile) -> String {
        match self.file_loader.extract_text(data, file).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, file = %file.name, "Text extraction failed");
                String::new()
            }
        }
    }
}

fn push_if_readable(candidates: &mut Candidates, source: ContextSource, name: &str, text: String) {
    if text.trim().is_empty() {
        tracing::debug!(file = %name, source = %source, "Skipping blank context source");
        return;
    }
    candidates.parts.push(ContextPart::new(source, name, text));
}

/// Keeps parts in order until `budget` characters of text are spent.
///
/// The part that crosses the budget is cut and marked; later parts are dropped.
pub fn fit_to_budget(candidates: Candidates, budget: usize) -> ContextBundle {
    let mut remaining = budget;
    let mut selected = Vec::new();

    for part in candidates.parts {
        if remaining == 0 {
            break;
        }

        let len = part.char_len();
        if len <= remaining {
            remaining -= len;
            selected.push(part);
        } else {
            let mut text: String = part.text.chars().take(remaining).collect();
            text.push_str(TRUNCATION_MARKER);
            remaining = 0;
            selected.push(ContextPart { text, ..part });
        }
    }

    let concatenated_text = selected
        .iter()
        .map(ContextPart::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    ContextBundle {
        parts: selected,
        concatenated_text,
        candidate_count: candidates.considered,
    }
}
