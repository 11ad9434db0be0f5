//! Anti-detection patches applied to every launched context (component B).
//!
//! Grounded on `examples/original_source/src/utils/browser_stealth.py`.

use rand::Rng;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Launch argument disabling Chromium's automation banner/flag surface.
pub const DISABLE_AUTOMATION_FLAG: &str = "--disable-blink-features=AutomationControlled";

/// Injected via an init script before any page script runs, so it applies to
/// every document (including same-origin navigations) in the context.
pub const STEALTH_INIT_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => false });

Object.defineProperty(navigator, 'plugins', {
    get: () => {
        const plugins = [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai' },
            { name: 'Native Client', filename: 'internal-nacl-plugin' },
        ];
        plugins.length = 3;
        return plugins;
    },
});

Object.defineProperty(navigator, 'languages', {
    get: () => ['en-US', 'en'],
});

if (!window.chrome) { window.chrome = {}; }
if (!window.chrome.runtime) { window.chrome.runtime = {}; }

const originalQuery = window.navigator.permissions.query;
window.navigator.permissions.query = (parameters) =>
    parameters.name === 'notifications'
        ? Promise.resolve({ state: Notification.permission })
        : originalQuery(parameters);
"#;

/// Randomized pacing delay mimicking human interaction (50-300ms default range).
pub async fn human_delay(min_ms: u64, max_ms: u64) {
    let millis = {
        let mut rng = rand::thread_rng();
        rng.gen_range(min_ms..=max_ms.max(min_ms))
    };
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Per-action-type delay range (§4.I supplement): clicks/hovers are quick,
/// fills/selects take slightly longer to mimic typing/choosing.
pub fn delay_range_for_action(action_type: &str) -> (u64, u64) {
    match action_type {
        "click" | "hover" | "keyboard" => (50, 150),
        "fill" | "select" => (150, 400),
        "scroll" => (100, 300),
        _ => (50, 300),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_ranges_are_well_formed() {
        for action in ["click", "fill", "scroll", "navigate"] {
            let (min, max) = delay_range_for_action(action);
            assert!(min <= max);
        }
    }
}
