//! Per-test evidence capture: screenshots, console/network logs, DOM
//! snapshot. Grounded on
//! `examples/original_source/src/executor/evidence_collector.py`.

use std::path::PathBuf;

use qa_browser_session::{ConsoleLevel, NetworkLogEntry, PageHandle};
use qa_core_types::Evidence;
use tracing::warn;

fn console_level_str(level: ConsoleLevel) -> &'static str {
    match level {
        ConsoleLevel::Log => "log",
        ConsoleLevel::Warning => "warning",
        ConsoleLevel::Error => "error",
    }
}

pub struct EvidenceCollector {
    evidence_dir: PathBuf,
    screenshot_count: u32,
}

impl EvidenceCollector {
    pub fn new(evidence_dir: PathBuf) -> Self {
        if let Err(e) = std::fs::create_dir_all(&evidence_dir) {
            warn!("failed to create evidence dir {}: {e}", evidence_dir.display());
        }
        Self { evidence_dir, screenshot_count: 0 }
    }

    /// Captures a viewport screenshot and writes it to disk, returning the
    /// path as a string (matching the persisted record's string-path shape).
    pub async fn take_screenshot(&mut self, page: &dyn PageHandle, label: &str) -> Option<String> {
        self.screenshot_count += 1;
        let name = if label.is_empty() {
            format!("screenshot_{}.png", self.screenshot_count)
        } else {
            format!("screenshot_{label}_{}.png", self.screenshot_count)
        };
        let path = self.evidence_dir.join(name);
        match page.screenshot(false).await {
            Ok(bytes) => match std::fs::write(&path, bytes) {
                Ok(()) => Some(path.to_string_lossy().into_owned()),
                Err(e) => {
                    warn!("failed to write screenshot to {}: {e}", path.display());
                    None
                }
            },
            Err(e) => {
                warn!("screenshot failed: {e}");
                None
            }
        }
    }

    pub async fn capture_dom_snapshot(&self, page: &dyn PageHandle) -> Option<String> {
        let path = self.evidence_dir.join("dom_snapshot.html");
        match page.content().await {
            Ok(content) => match std::fs::write(&path, content) {
                Ok(()) => Some(path.to_string_lossy().into_owned()),
                Err(e) => {
                    warn!("failed to write dom snapshot to {}: {e}", path.display());
                    None
                }
            },
            Err(e) => {
                warn!("dom snapshot failed: {e}");
                None
            }
        }
    }

    pub fn save_logs(&self, console_logs: &[String], network_log: &[NetworkLogEntry]) {
        let console_path = self.evidence_dir.join("console.log");
        if let Err(e) = std::fs::write(&console_path, console_logs.join("\n")) {
            warn!("failed to write console log: {e}");
        }

        let network_path = self.evidence_dir.join("network.json");
        match serde_json::to_string_pretty(network_log) {
            Ok(text) => {
                if let Err(e) = std::fs::write(&network_path, text) {
                    warn!("failed to write network log: {e}");
                }
            }
            Err(e) => warn!("failed to serialize network log: {e}"),
        }
    }

    pub fn build_evidence(&self, screenshots: Vec<String>, console_logs: Vec<String>, network_log: &[NetworkLogEntry]) -> Evidence {
        let dom_snapshot_path = self.evidence_dir.join("dom_snapshot.html");
        Evidence {
            screenshots,
            console_logs,
            network_log: network_log.iter().map(|e| serde_json::to_value(e).unwrap_or_default()).collect(),
            dom_snapshot_path: dom_snapshot_path.exists().then(|| dom_snapshot_path.to_string_lossy().into_owned()),
            video_path: None,
        }
    }
}

/// Formats a page's console log into the `"[level] text"` lines the original
/// persists verbatim.
pub fn format_console_logs(page: &dyn PageHandle) -> Vec<String> {
    page.console_log()
        .into_iter()
        .map(|entry| format!("[{}] {}", console_level_str(entry.level), entry.text))
        .collect()
}
