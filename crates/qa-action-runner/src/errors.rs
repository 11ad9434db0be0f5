use thiserror::Error;

use qa_browser_session::BrowserError;

#[derive(Debug, Error)]
pub enum ActionRunnerError {
    #[error("{action_type} action requires a selector")]
    MissingSelector { action_type: String },
    #[error(transparent)]
    Browser(#[from] BrowserError),
}
