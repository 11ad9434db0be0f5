use thiserror::Error;

/// Errors surfaced by the `BrowserSession`/`PageHandle` trait boundary.
///
/// Mirrors the `is_retryable`/`severity` convention used across the other
/// crates so callers (selector resolver, executor) can treat navigation and
/// CDP I/O failures as retryable without matching on variant internals.
#[derive(Debug, Error, Clone)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("element not found for selector `{0}`")]
    ElementNotFound(String),

    #[error("element for selector `{0}` was found but is not visible/enabled")]
    ElementNotActionable(String),

    #[error("script evaluation failed: {0}")]
    EvalFailed(String),

    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("CDP transport error: {0}")]
    CdpIo(String),

    #[error("session already closed")]
    SessionClosed,
}

impl BrowserError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BrowserError::NavigationTimeout { .. }
                | BrowserError::NavigationFailed { .. }
                | BrowserError::CdpIo(_)
                | BrowserError::ElementNotFound(_)
        )
    }

    pub fn severity(&self) -> u8 {
        match self {
            BrowserError::LaunchFailed(_) => 90,
            BrowserError::SessionClosed => 80,
            BrowserError::CdpIo(_) => 60,
            BrowserError::NavigationTimeout { .. } | BrowserError::NavigationFailed { .. } => 50,
            BrowserError::ElementNotFound(_) | BrowserError::ElementNotActionable(_) => 30,
            BrowserError::EvalFailed(_) | BrowserError::ScreenshotFailed(_) => 20,
        }
    }
}
