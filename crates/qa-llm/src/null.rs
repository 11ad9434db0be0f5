use async_trait::async_trait;

use crate::client::LlmClient;
use crate::errors::LlmError;

/// Used when `ANTHROPIC_API_KEY` is absent: every tier that would otherwise
/// call out to an LLM (deep planning, vision auth fallback, AI-assisted
/// assertion evaluation) falls back to its deterministic path instead of
/// erroring the whole run.
pub struct NullLlmClient;

#[async_trait]
impl LlmClient for NullLlmClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }

    async fn complete_with_image(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _image_base64: &str,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }
}
