//! LLM client trait and the ambient Anthropic-backed default (used by the
//! planner, smart-auth's vision tier, the executor's AI-fallback step, and
//! AI-assisted assertion evaluation).

pub mod anthropic;
pub mod client;
pub mod errors;
pub mod json;
pub mod null;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use errors::LlmError;
pub use json::{extract_json_object, parse_json_response};
pub use null::NullLlmClient;

/// Builds the ambient default client: Anthropic when `ANTHROPIC_API_KEY` is
/// set, `NullLlmClient` otherwise so LLM-optional tiers degrade gracefully.
pub fn default_client() -> std::sync::Arc<dyn LlmClient> {
    match AnthropicClient::from_env() {
        Ok(client) => std::sync::Arc::new(client),
        Err(_) => std::sync::Arc::new(NullLlmClient),
    }
}
