use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::BrowserError;
use crate::types::{ConsoleLogEntry, NetworkLogEntry, StorageState, WaitUntil};

/// The assumed-external browser-automation primitive (Playwright-equivalent).
/// The crawler, action runner, smart-auth resolver and assertion checker all
/// depend on this trait, never on a concrete driver — see
/// `crate::chromium::ChromiumPageHandle` for the ambient default.
#[async_trait]
pub trait PageHandle: Send + Sync {
    async fn navigate(&self, url: &str, wait: WaitUntil, timeout: Duration) -> Result<(), BrowserError>;

    /// Best-effort wait; a timeout here is tolerated by callers (§4.I `navigate`).
    async fn wait_for_load_state(&self, wait: WaitUntil, timeout: Duration) -> Result<(), BrowserError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn select(&self, selector: &str, value: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn hover(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;
    async fn press_key(&self, key: &str) -> Result<(), BrowserError>;

    async fn scroll_to_selector(&self, selector: &str) -> Result<(), BrowserError>;
    async fn scroll_to_y(&self, y: i64) -> Result<(), BrowserError>;
    async fn scroll_to_bottom(&self) -> Result<(), BrowserError>;

    async fn wait_for_timeout(&self, duration: Duration);
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Exists in the DOM at all (used by `element_hidden`'s "absent" branch).
    async fn exists(&self, selector: &str) -> Result<bool, BrowserError>;
    async fn is_visible(&self, selector: &str) -> Result<bool, BrowserError>;
    async fn count(&self, selector: &str) -> Result<usize, BrowserError>;
    async fn text_content(&self, selector: Option<&str>) -> Result<String, BrowserError>;

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, BrowserError>;
    async fn content(&self) -> Result<String, BrowserError>;

    async fn url(&self) -> String;
    async fn title(&self) -> String;

    fn console_log(&self) -> Vec<ConsoleLogEntry>;
    fn network_log(&self) -> Vec<NetworkLogEntry>;

    async fn press_escape(&self) -> Result<(), BrowserError> {
        self.press_key("Escape").await
    }
}

/// One isolated browser context: a cookie jar / localStorage / network log
/// boundary. Owned exclusively by one test (§5 "Session boundary = test
/// boundary").
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, BrowserError>;
    async fn capture_storage_state(&self) -> Result<StorageState, BrowserError>;
    async fn start_video_recording(&self, out_dir: &Path) -> Result<(), BrowserError>;
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}
