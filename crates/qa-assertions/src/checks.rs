//! Per-kind assertion checks. Grounded on
//! `examples/original_source/src/executor/assertion_checker.py`.

use std::path::Path;
use std::time::Duration;

use regex::Regex;
use tracing::warn;

use qa_browser_session::{NetworkLogEntry, PageHandle, WaitUntil, BENIGN_CONSOLE_PATTERNS};
use qa_config::FrameworkConfig;
use qa_llm::LlmClient;
use qa_planner::Assertion;

use crate::ai_evaluate::check_ai_evaluate;
use crate::screenshot_diff::check_screenshot_diff;
use crate::types::AssertionCheckResult;

const VISIBILITY_TIMEOUT: Duration = Duration::from_millis(5000);

async fn check_element_visible(page: &dyn PageHandle, selector: &str) -> AssertionCheckResult {
    match page.wait_for_selector(selector, VISIBILITY_TIMEOUT).await {
        Ok(()) => match page.is_visible(selector).await {
            Ok(true) => AssertionCheckResult::pass(format!("element visible: {selector}")),
            Ok(false) => AssertionCheckResult::fail(format!("element present but not visible: {selector}")),
            Err(e) => AssertionCheckResult::fail(format!("could not check visibility of {selector}: {e}")),
        },
        Err(e) => AssertionCheckResult::fail(format!("element not visible within timeout: {selector} ({e})")),
    }
}

/// Passed when the element is absent from the DOM, OR present but not
/// visible. Matches the original's permissive "any exception is a pass" —
/// a missing element is the common, expected case here.
async fn check_element_hidden(page: &dyn PageHandle, selector: &str) -> AssertionCheckResult {
    match page.exists(selector).await {
        Ok(false) => AssertionCheckResult::pass(format!("element absent: {selector}")),
        Ok(true) => match page.is_visible(selector).await {
            Ok(false) => AssertionCheckResult::pass(format!("element present but hidden: {selector}")),
            Ok(true) => AssertionCheckResult::fail(format!("element is visible: {selector}")),
            Err(_) => AssertionCheckResult::pass(format!("element not found: {selector}")),
        },
        Err(_) => AssertionCheckResult::pass(format!("element not found: {selector}")),
    }
}

async fn check_text_contains(page: &dyn PageHandle, assertion: &Assertion) -> AssertionCheckResult {
    let expected = match &assertion.expected_value {
        Some(v) => v,
        None => return AssertionCheckResult::fail("text_contains requires expected_value"),
    };
    let text = match &assertion.selector {
        Some(selector) => {
            if let Err(e) = page.wait_for_selector(selector, VISIBILITY_TIMEOUT).await {
                return AssertionCheckResult::fail(format!("selector not found: {selector} ({e})"));
            }
            page.text_content(Some(selector)).await
        }
        None => page.text_content(None).await,
    };
    match text {
        Ok(text) if text.contains(expected.as_str()) => {
            AssertionCheckResult::pass(format!("text contains '{expected}'"))
        }
        Ok(text) => AssertionCheckResult::fail(format!(
            "text does not contain '{expected}' (got: {})",
            text.chars().take(200).collect::<String>()
        )),
        Err(e) => AssertionCheckResult::fail(format!("could not read text: {e}")),
    }
}

async fn check_text_equals(page: &dyn PageHandle, assertion: &Assertion) -> AssertionCheckResult {
    let (selector, expected) = match (&assertion.selector, &assertion.expected_value) {
        (Some(s), Some(e)) => (s, e),
        _ => return AssertionCheckResult::fail("text_equals requires selector and expected_value"),
    };
    if let Err(e) = page.wait_for_selector(selector, VISIBILITY_TIMEOUT).await {
        return AssertionCheckResult::fail(format!("selector not found: {selector} ({e})"));
    }
    match page.text_content(Some(selector)).await {
        Ok(text) if text.trim() == expected.trim() => AssertionCheckResult::pass("text matches exactly"),
        Ok(text) => AssertionCheckResult::fail(format!("expected '{}', got '{}'", expected.trim(), text.trim())),
        Err(e) => AssertionCheckResult::fail(format!("could not read text: {e}")),
    }
}

async fn check_text_matches(page: &dyn PageHandle, assertion: &Assertion) -> AssertionCheckResult {
    let pattern = match &assertion.expected_value {
        Some(v) => v,
        None => return AssertionCheckResult::fail("text_matches requires expected_value"),
    };
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => return AssertionCheckResult::fail(format!("invalid regex pattern: {e}")),
    };
    let text = match &assertion.selector {
        Some(selector) => {
            if let Err(e) = page.wait_for_selector(selector, VISIBILITY_TIMEOUT).await {
                return AssertionCheckResult::fail(format!("selector not found: {selector} ({e})"));
            }
            page.text_content(Some(selector)).await
        }
        None => page.text_content(None).await,
    };
    match text {
        Ok(text) if re.is_match(&text) => AssertionCheckResult::pass(format!("text matches /{pattern}/")),
        Ok(_) => AssertionCheckResult::fail(format!("text does not match /{pattern}/")),
        Err(e) => AssertionCheckResult::fail(format!("could not read text: {e}")),
    }
}

/// Synchronous in the original (no browser round-trip needed, the URL is
/// already known). Substring match first, then falls back to regex.
fn check_url_matches(current_url: &str, expected_value: &str) -> AssertionCheckResult {
    if current_url.contains(expected_value) {
        return AssertionCheckResult::pass(format!("url contains '{expected_value}'"));
    }
    match Regex::new(expected_value) {
        Ok(re) if re.is_match(current_url) => AssertionCheckResult::pass(format!("url matches /{expected_value}/")),
        Ok(_) => AssertionCheckResult::fail(format!("url '{current_url}' does not match '{expected_value}'")),
        Err(e) => AssertionCheckResult::fail(format!("invalid url pattern '{expected_value}': {e}")),
    }
}

async fn check_element_count(page: &dyn PageHandle, assertion: &Assertion) -> AssertionCheckResult {
    let (selector, expected) = match (&assertion.selector, &assertion.expected_value) {
        (Some(s), Some(e)) => (s, e),
        _ => return AssertionCheckResult::fail("element_count requires selector and expected_value"),
    };
    let expected_count: usize = match expected.parse() {
        Ok(n) => n,
        Err(_) => return AssertionCheckResult::fail(format!("expected_value '{expected}' is not an integer")),
    };
    match page.count(selector).await {
        Ok(actual) if actual == expected_count => AssertionCheckResult::pass(format!("found {actual} elements")),
        Ok(actual) => AssertionCheckResult::fail(format!("expected {expected_count} elements, found {actual}")),
        Err(e) => AssertionCheckResult::fail(format!("could not count elements: {e}")),
    }
}

fn check_network_request_made(network_log: &[NetworkLogEntry], expected_value: &str) -> AssertionCheckResult {
    if network_log.iter().any(|entry| entry.url.contains(expected_value)) {
        AssertionCheckResult::pass(format!("found network request containing '{expected_value}'"))
    } else {
        AssertionCheckResult::fail(format!("no network request found containing '{expected_value}'"))
    }
}

/// Filters for entries containing "error" (case-insensitive) while excluding
/// known-benign patterns — distinct from `BENIGN_CONSOLE_PATTERNS` capture-time
/// filtering, this is a second, independent pass applied at assertion time.
fn check_no_console_errors(console_errors: &[String]) -> AssertionCheckResult {
    let offending: Vec<&String> = console_errors
        .iter()
        .filter(|e| {
            let lower = e.to_lowercase();
            lower.contains("error") && !lower.contains("favicon") && !BENIGN_CONSOLE_PATTERNS.iter().any(|p| lower.contains(&p.to_lowercase()))
        })
        .collect();
    if offending.is_empty() {
        AssertionCheckResult::pass("no console errors")
    } else {
        AssertionCheckResult::fail(format!("console errors found: {offending:?}"))
    }
}

fn check_response_status(network_log: &[NetworkLogEntry], expected_value: &str) -> AssertionCheckResult {
    let expected_status: u16 = match expected_value.parse() {
        Ok(n) => n,
        Err(_) => return AssertionCheckResult::fail(format!("expected_value '{expected_value}' is not a status code")),
    };
    if network_log.iter().any(|entry| entry.status == Some(expected_status)) {
        AssertionCheckResult::pass(format!("found response with status {expected_status}"))
    } else {
        AssertionCheckResult::fail(format!("no response found with status {expected_status}"))
    }
}

/// Dispatches an assertion to its check function. `baseline_image_path`,
/// when present, is the baseline PNG to diff a `screenshot_diff` assertion
/// against; `llm` is required only for `ai_evaluate`.
pub async fn check_assertion(
    page: &dyn PageHandle,
    assertion: &Assertion,
    console_errors: &[String],
    network_log: &[NetworkLogEntry],
    config: &FrameworkConfig,
    baseline_image_path: Option<&Path>,
    llm: Option<&dyn LlmClient>,
) -> AssertionCheckResult {
    let result = match assertion.assertion_type.as_str() {
        "element_visible" => match &assertion.selector {
            Some(selector) => check_element_visible(page, selector).await,
            None => AssertionCheckResult::fail("element_visible requires a selector"),
        },
        "element_hidden" => match &assertion.selector {
            Some(selector) => check_element_hidden(page, selector).await,
            None => AssertionCheckResult::fail("element_hidden requires a selector"),
        },
        "text_contains" => check_text_contains(page, assertion).await,
        "text_equals" => check_text_equals(page, assertion).await,
        "text_matches" => check_text_matches(page, assertion).await,
        "url_matches" => match &assertion.expected_value {
            Some(expected) => check_url_matches(&page.url().await, expected),
            None => AssertionCheckResult::fail("url_matches requires expected_value"),
        },
        "screenshot_diff" => {
            let tolerance = assertion.tolerance.unwrap_or(config.visual_diff_tolerance);
            let full_page = assertion.expected_value.as_deref() == Some("full_page");

            // Best-effort settle: let in-flight requests finish, then give
            // fonts/animations a moment before capturing.
            if page.wait_for_load_state(WaitUntil::NetworkIdle, Duration::from_millis(3000)).await.is_err() {
                warn!("networkidle timeout before screenshot_diff capture, continuing");
            }
            tokio::time::sleep(Duration::from_millis(500)).await;

            match page.screenshot(full_page).await {
                Ok(bytes) => check_screenshot_diff(&bytes, baseline_image_path, tolerance),
                Err(e) => AssertionCheckResult::fail(format!("could not capture screenshot: {e}")),
            }
        }
        "element_count" => check_element_count(page, assertion).await,
        "network_request_made" => match &assertion.expected_value {
            Some(expected) => check_network_request_made(network_log, expected),
            None => AssertionCheckResult::fail("network_request_made requires expected_value"),
        },
        "no_console_errors" => check_no_console_errors(console_errors),
        "response_status" => match &assertion.expected_value {
            Some(expected) => check_response_status(network_log, expected),
            None => AssertionCheckResult::fail("response_status requires expected_value"),
        },
        "ai_evaluate" => match (&assertion.expected_value, llm) {
            (Some(intent), Some(llm)) => check_ai_evaluate(page, llm, intent).await,
            (None, _) => AssertionCheckResult::fail("ai_evaluate requires expected_value as the intent"),
            (_, None) => AssertionCheckResult::fail("ai_evaluate requires an LLM client"),
        },
        other => {
            warn!("unknown assertion type: {other}");
            AssertionCheckResult::fail(format!("unknown assertion type: {other}"))
        }
    };
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_matches_substring() {
        let result = check_url_matches("https://example.com/dashboard", "dashboard");
        assert!(result.passed);
    }

    #[test]
    fn url_matches_regex_when_not_a_substring() {
        let result = check_url_matches("https://example.com/item/42", r"/item/\d+$");
        assert!(result.passed);
    }

    #[test]
    fn url_matches_fails_when_neither_matches() {
        let result = check_url_matches("https://example.com/login", "dashboard");
        assert!(!result.passed);
    }

    #[test]
    fn console_errors_filters_benign_favicon_noise() {
        let errors = vec!["GET favicon.ico 404 (error)".to_string()];
        let result = check_no_console_errors(&errors);
        assert!(result.passed);
    }

    #[test]
    fn console_errors_flags_real_error() {
        let errors = vec!["Uncaught TypeError: cannot read property of undefined".to_string()];
        let result = check_no_console_errors(&errors);
        assert!(!result.passed);
    }

    #[test]
    fn network_request_made_checks_substring() {
        let log = vec![NetworkLogEntry {
            url: "https://api.example.com/v1/users".to_string(),
            method: "GET".to_string(),
            resource_type: "fetch".to_string(),
            status: Some(200),
            content_type: None,
        }];
        assert!(check_network_request_made(&log, "/v1/users").passed);
        assert!(!check_network_request_made(&log, "/v1/orders").passed);
    }

    #[test]
    fn response_status_matches_exact_code() {
        let log = vec![NetworkLogEntry {
            url: "https://api.example.com".to_string(),
            method: "GET".to_string(),
            resource_type: "fetch".to_string(),
            status: Some(404),
            content_type: None,
        }];
        assert!(check_response_status(&log, "404").passed);
        assert!(!check_response_status(&log, "200").passed);
    }
}
