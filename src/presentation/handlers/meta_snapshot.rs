use serde::Serialize;

use crate::application::ports::ComposedPrompt;
use crate::application::services::estimate_tokens;
use crate::domain::{ContextBundle, ContextSource, Depth, Mode, ModelRequestParameters};

/// What was sent to the model, emitted before any output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaSnapshot {
    pub files: Vec<MetaFile>,
    pub tokens: usize,
    pub mode: Mode,
    pub depth: Depth,
    pub critique: bool,
    pub max_tokens_used: u32,
    pub retrieval: String,
    pub retrieval_stats: RetrievalStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaFile {
    pub name: String,
    pub source: ContextSource,
    pub chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalStats {
    pub k: u32,
    pub selected: usize,
    pub candidates: usize,
}

impl MetaSnapshot {
    pub fn new(
        params: &ModelRequestParameters,
        bundle: &ContextBundle,
        prompt: &ComposedPrompt,
    ) -> Self {
        let files = bundle
            .parts
            .iter()
            .map(|part| MetaFile {
                name: part.name.clone(),
                source: part.source,
                chars: part.char_len(),
            })
            .collect();

        Self {
            files,
            tokens: estimate_tokens(prompt.char_len()),
            mode: params.mode,
            depth: params.depth,
            critique: params.critique,
            max_tokens_used: params.max_output_tokens,
            retrieval: params.retrieval.clone(),
            retrieval_stats: RetrievalStats {
                k: params.rag_k,
                selected: bundle.parts.len(),
                candidates: bundle.candidate_count,
            },
        }
    }
}
