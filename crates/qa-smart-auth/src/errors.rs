use thiserror::Error;

use qa_browser_session::BrowserError;
use qa_llm::LlmError;

#[derive(Debug, Error)]
pub enum SmartAuthError {
    #[error("no login selectors could be resolved for {url}")]
    SelectorsNotFound { url: String },

    #[error("browser error during authentication: {0}")]
    Browser(#[from] BrowserError),

    #[error("login form not verified as successful for {url}")]
    VerificationFailed { url: String },

    #[error("LLM vision fallback failed: {0}")]
    Llm(#[from] LlmError),
}
