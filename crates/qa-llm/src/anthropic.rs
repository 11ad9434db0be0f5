//! Anthropic Messages API client. Grounded on
//! `soulbrowser-kernel::llm::anthropic::ClaudeLlmProvider` (request/response
//! shape, header set) and
//! `examples/original_source/src/ai/client.py::AIClient` (call semantics —
//! temperature, per-call logging, truncation detection).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::LlmClient;
use crate::errors::LlmError;

const DEFAULT_MODEL: &str = "claude-3-5-sonnet-latest";
const API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    /// Reads `ANTHROPIC_API_KEY` from the environment; callers needing a
    /// different source should construct with `with_api_key` instead.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Self::with_api_key(api_key)
    }

    pub fn with_api_key(api_key: String) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(1800))
            .build()
            .map_err(|err| LlmError::RequestFailed(err.to_string()))?;
        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn send(&self, body: MessagesRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{API_BASE}/messages");
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| LlmError::RequestFailed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(LlmError::BadResponse {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|err| LlmError::RequestFailed(err.to_string()))?;

        if parsed.stop_reason.as_deref() == Some("max_tokens") {
            warn!(
                max_tokens = body.max_tokens,
                "AI response was truncated at max_tokens; consider raising the configured limit"
            );
        }

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        info!(model = %self.model, max_tokens, "calling Anthropic messages API");
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature: 0.3,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: vec![Content::Text { text: user_message }],
            }],
        };
        self.send(body).await
    }

    async fn complete_with_image(
        &self,
        system_prompt: &str,
        user_message: &str,
        image_base64: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        info!(model = %self.model, max_tokens, "calling Anthropic messages API with image");
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature: 0.3,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: vec![
                    Content::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: "image/png",
                            data: image_base64,
                        },
                    },
                    Content::Text { text: user_message },
                ],
            }],
        };
        self.send(body).await
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Content<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}
