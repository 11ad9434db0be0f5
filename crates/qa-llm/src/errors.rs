use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("llm request failed: {0}")]
    RequestFailed(String),
    #[error("llm returned {status}: {body}")]
    BadResponse { status: u16, body: String },
    #[error("llm response missing content")]
    EmptyResponse,
    #[error("llm returned invalid JSON: {0}")]
    InvalidJson(String),
}

impl LlmError {
    /// Transient failures (network hiccup, 5xx, rate limit) are worth a retry
    /// upstream; malformed output or config errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::RequestFailed(_))
            || matches!(self, LlmError::BadResponse { status, .. } if *status >= 500 || *status == 429)
    }
}
