use async_trait::async_trait;
use serde_json::Value;

use crate::errors::LlmError;

/// LLM text/vision completion boundary used by the planner, smart-auth
/// vision fallback, assertion evaluator and executor's AI-fallback path.
/// Grounded on `examples/original_source/src/ai/client.py`'s `AIClient`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    async fn complete_with_image(
        &self,
        system_prompt: &str,
        user_message: &str,
        image_base64: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Convenience wrapper: completes then runs the response through the
    /// defensive JSON parser.
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_message: &str,
        max_tokens: u32,
    ) -> Result<Value, LlmError> {
        let text = self.complete(system_prompt, user_message, max_tokens).await?;
        crate::json::parse_json_response(&text)
    }
}
