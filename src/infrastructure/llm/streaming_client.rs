use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ComposedPrompt, LlmClient, LlmClientError, UpstreamEventStream,
};
use crate::presentation::config::{LlmSettings, WireFormat};

use super::sse_decoder::SseDecoder;
use super::wire_format::normalize_frame;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct StreamingLlmClient {
    client: Client,
    provider: String,
    wire_format: WireFormat,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
    max_output_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<ResponsesOutputItem>,
}

#[derive(Deserialize)]
struct ResponsesOutputItem {
    #[serde(default)]
    content: Vec<ResponsesContent>,
}

#[derive(Deserialize)]
struct ResponsesContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl StreamingLlmClient {
    fn endpoint(&self) -> String {
        match self.wire_format {
            WireFormat::ChatCompletions => format!("{}/chat/completions", self.base_url),
            WireFormat::Responses => format!("{}/responses", self.base_url),
        }
    }

    fn build_request(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
        stream: Option<bool>,
    ) -> reqwest::RequestBuilder {
        let request = self.client.post(self.endpoint());
        let request = match self.wire_format {
            WireFormat::ChatCompletions => request.json(&ChatCompletionRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: &prompt.system_text,
                    },
                    ChatMessage {
                        role: "user",
                        content: &prompt.user_text,
                    },
                ],
                max_tokens: max_output_tokens,
                temperature: self.temperature,
                stream,
            }),
            WireFormat::Responses => request.json(&ResponsesRequest {
                model: &self.model,
                instructions: &prompt.system_text,
                input: &prompt.user_text,
                max_output_tokens,
                temperature: self.temperature,
                stream,
            }),
        };
        self.apply_auth(request)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == "azure" {
            request.header("api-key", &self.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, LlmClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmClient for StreamingLlmClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, wire_format = ?self.wire_format))]
    async fn complete(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
    ) -> Result<String, LlmClientError> {
        let response = self
            .send(self.build_request(prompt, max_output_tokens, None))
            .await?;

        match self.wire_format {
            WireFormat::ChatCompletions => {
                let completion: ChatCompletionResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

                completion
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content.unwrap_or_default())
                    .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))
            }
            WireFormat::Responses => {
                let completion: ResponsesResponse = response
                    .json()
                    .await
                    .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

                if let Some(text) = completion.output_text.filter(|t| !t.is_empty()) {
                    return Ok(text);
                }

                Ok(completion
                    .output
                    .into_iter()
                    .flat_map(|item| item.content)
                    .filter(|part| part.kind == "output_text")
                    .filter_map(|part| part.text)
                    .collect())
            }
        }
    }

    #[tracing::instrument(skip(self, prompt), fields(model = %self.model, wire_format = ?self.wire_format))]
    async fn complete_stream(
        &self,
        prompt: &ComposedPrompt,
        max_output_tokens: u32,
    ) -> Result<UpstreamEventStream, LlmClientError> {
        let response = self
            .send(self.build_request(prompt, max_output_tokens, Some(true)))
            .await?;

        let wire_format = self.wire_format;
        let mut bytes = Box::pin(response.bytes_stream());

        let events = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for frame in decoder.push(&chunk) {
                            yield Ok(normalize_frame(wire_format, &frame));
                        }
                    }
                    Err(e) => {
                        yield Err(LlmClientError::ApiRequestFailed(e.to_string()));
                        return;
                    }
                }
            }
            if let Some(frame) = decoder.finish() {
                yield Ok(normalize_frame(wire_format, &frame));
            }
        };

        Ok(Box::pin(events))
    }
}

pub fn create_streaming_llm_client(
    settings: &LlmSettings,
) -> Result<StreamingLlmClient, LlmClientError> {
    let base_url = match settings.provider.as_str() {
        "openai" => settings
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string(),
        "lmstudio" => settings
            .base_url
            .clone()
            .ok_or_else(|| {
                LlmClientError::NotConfigured("base_url required for lmstudio provider".to_string())
            })?
            .trim_end_matches('/')
            .to_string(),
        "azure" => {
            let endpoint = settings.azure_endpoint.as_ref().ok_or_else(|| {
                LlmClientError::NotConfigured(
                    "azure_endpoint required for azure provider".to_string(),
                )
            })?;
            format!(
                "{}/openai/deployments/{}",
                endpoint.trim_end_matches('/'),
                settings.chat_model
            )
        }
        other => {
            return Err(LlmClientError::NotConfigured(format!(
                "unknown provider: {other}"
            )));
        }
    };

    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

    Ok(StreamingLlmClient {
        client,
        provider: settings.provider.clone(),
        wire_format: settings.wire_format,
        base_url,
        api_key: settings.api_key.clone(),
        model: settings.chat_model.clone(),
        temperature: settings.temperature,
    })
}
