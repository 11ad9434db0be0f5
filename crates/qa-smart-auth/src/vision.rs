//! Tier 3: LLM vision fallback, used only once tiers 1 and 2 have failed to
//! locate a login form. Grounded on
//! `examples/original_source/src/ai/prompts/auth.py` (prompt text) and
//! `examples/original_source/src/auth/smart_auth.py::_llm_detect_login_form`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qa_browser_session::PageHandle;
use qa_llm::LlmClient;
use serde::Deserialize;

use crate::types::{DetectionMethod, LoginSelectors};

const MAX_DOM_CHARS: usize = 6000;
const MAX_TOKENS: u32 = 1024;
const MIN_CONFIDENCE: f64 = 0.5;

const AUTH_DETECTION_SYSTEM_PROMPT: &str = "You are a web automation expert analyzing a login page. \
Given a screenshot and DOM snippet of a page, identify the CSS selectors for \
the username/email field, password field, and submit button.

Respond with ONLY a JSON object in this exact format:
{
  \"username_selector\": \"<css selector or null>\",
  \"password_selector\": \"<css selector>\",
  \"submit_selector\": \"<css selector or null>\",
  \"confidence\": <float between 0 and 1>
}

If you cannot find a password field with reasonable confidence, set \
password_selector to null and confidence to 0.";

fn build_auth_detection_prompt(dom_snippet: &str, page_url: &str) -> String {
    let truncated: String = dom_snippet.chars().take(MAX_DOM_CHARS).collect();
    format!(
        "Page URL: {page_url}\n\nDOM snippet (truncated to {MAX_DOM_CHARS} chars):\n{truncated}\n\n\
         Identify the login form's username, password and submit selectors."
    )
}

#[derive(Debug, Deserialize)]
struct DetectionResponse {
    username_selector: Option<String>,
    password_selector: Option<String>,
    submit_selector: Option<String>,
    #[serde(default)]
    confidence: f64,
}

/// Takes a screenshot and DOM snapshot of the current page, asks the LLM to
/// locate the login form, and accepts the result only if confidence clears
/// `MIN_CONFIDENCE` and all three selectors were returned.
pub async fn llm_detect_login_form(
    page: &dyn PageHandle,
    llm: &dyn LlmClient,
) -> Option<LoginSelectors> {
    let screenshot = page.screenshot(false).await.ok()?;
    let dom = page.content().await.ok()?;
    let url = page.url().await;

    let image_base64 = BASE64.encode(screenshot);
    let prompt = build_auth_detection_prompt(&dom, &url);

    let raw = llm
        .complete_with_image(AUTH_DETECTION_SYSTEM_PROMPT, &prompt, &image_base64, MAX_TOKENS)
        .await
        .ok()?;
    let parsed_value = qa_llm::parse_json_response(&raw).ok()?;
    let parsed: DetectionResponse = serde_json::from_value(parsed_value).ok()?;

    if parsed.confidence < MIN_CONFIDENCE {
        return None;
    }
    let password_selector = parsed.password_selector?;

    Some(LoginSelectors {
        username_selector: parsed.username_selector,
        password_selector,
        submit_selector: parsed.submit_selector,
        detection_method: DetectionMethod::LlmVision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_truncates_dom_to_max_chars() {
        let huge = "x".repeat(MAX_DOM_CHARS * 2);
        let prompt = build_auth_detection_prompt(&huge, "https://example.com/login");
        assert!(prompt.len() < MAX_DOM_CHARS * 2);
    }
}
