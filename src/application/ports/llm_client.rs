use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

/// System/user message pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_text: String,
    pub user_text: String,
}

impl ComposedPrompt {
    pub fn char_len(&self) -> usize {
        self.system_text.chars().count() + self.user_text.chars().count()
    }
}

/// Upstream stream frame after wire-format normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    DeltaText(String),
    Error(String),
    Completed,
    Ignorable,
}

pub type UpstreamEventStream =
    Pin<Box<dyn Stream<Item = Result<UpstreamEvent, LlmClientError>> + Send + 'static>>;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
    ) -> Result<String, LlmClientError>;

    /// Opens a streaming request. Dropping the returned stream aborts the connection.
    async fn complete_stream(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
    ) -> Result<UpstreamEventStream, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("service not configured: {0}")]
    NotConfigured(String),
}
