use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Credential pair supplied by the operator (env vars, config file, or CLI flags).
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Caller-supplied selectors that skip detection entirely (tier 1). Any field
/// left `None` falls through to tier 2/3 resolution for that role only if
/// `username_selector`/`password_selector` are both absent; a partial set
/// with at least username+password present is used as-is.
#[derive(Clone, Debug, Default)]
pub struct ExplicitSelectors {
    pub username_selector: Option<String>,
    pub password_selector: Option<String>,
    pub submit_selector: Option<String>,
}

/// The resolved set of selectors for a login form, plus how they were found.
/// Mirrors the richer `AuthFlow` populated by `examples/original_source/src/auth/smart_auth.py`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginSelectors {
    pub username_selector: Option<String>,
    pub password_selector: String,
    pub submit_selector: Option<String>,
    pub detection_method: DetectionMethod,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Explicit,
    Heuristic,
    LlmVision,
    PartialFallback,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Explicit => "explicit",
            DetectionMethod::Heuristic => "heuristic",
            DetectionMethod::LlmVision => "llm_vision",
            DetectionMethod::PartialFallback => "partial_fallback",
        }
    }
}

impl LoginSelectors {
    pub fn to_detected_selectors(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(u) = &self.username_selector {
            map.insert("username".to_string(), u.clone());
        }
        map.insert("password".to_string(), self.password_selector.clone());
        if let Some(s) = &self.submit_selector {
            map.insert("submit".to_string(), s.clone());
        }
        map
    }
}

/// Outcome of a full `authenticate_and_capture_state` attempt.
#[derive(Clone, Debug)]
pub struct SmartAuthResult {
    pub success: bool,
    pub selectors: Option<LoginSelectors>,
    pub storage_state: Option<qa_browser_session::StorageState>,
    pub failure_reason: Option<String>,
}

impl SmartAuthResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            selectors: None,
            storage_state: None,
            failure_reason: Some(reason.into()),
        }
    }
}
