use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cookies + localStorage captured after a successful login (glossary:
/// "Storage state"), seeded into later isolated sessions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageState {
    pub cookies: Vec<Cookie>,
    /// origin -> (key -> value)
    pub local_storage: HashMap<String, HashMap<String, String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 800 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitUntil {
    DomContentLoaded,
    NetworkIdle,
    Load,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkLogEntry {
    pub url: String,
    pub method: String,
    pub resource_type: String,
    pub status: Option<u16>,
    pub content_type: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleLevel {
    Log,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub struct ConsoleLogEntry {
    pub level: ConsoleLevel,
    pub text: String,
}

/// Benign console-error patterns excluded by the `no_console_errors` assertion (§4.J).
pub const BENIGN_CONSOLE_PATTERNS: &[&str] = &["favicon.ico", "DevTools failed to load"];
