use std::sync::Arc;

use crate::application::ports::{FileStore, LibraryStore, LlmClient};
use crate::application::services::{ContextAssembler, ModelRelay};
use crate::presentation::config::Settings;

pub struct AppState<L>
where
    L: LlmClient,
{
    pub context_assembler: Arc<ContextAssembler>,
    pub model_relay: Arc<ModelRelay<L>>,
    pub file_store: Arc<dyn FileStore>,
    pub library_store: Arc<dyn LibraryStore>,
    pub settings: Settings,
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            context_assembler: Arc::clone(&self.context_assembler),
            model_relay: Arc::clone(&self.model_relay),
            file_store: Arc::clone(&self.file_store),
            library_store: Arc::clone(&self.library_store),
            settings: self.settings.clone(),
        }
    }
}
