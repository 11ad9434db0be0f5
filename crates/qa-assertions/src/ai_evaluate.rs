//! LLM-judged `ai_evaluate` assertion. Grounded on
//! `examples/original_source/src/ai/prompts/evaluation.py`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;

use qa_browser_session::PageHandle;
use qa_llm::LlmClient;

use crate::types::AssertionCheckResult;

const MAX_TOKENS: u32 = 512;
const MAX_TEXT_CHARS: usize = 3000;

/// Confidence below this is always a fail, regardless of the LLM's `passed`
/// verdict — "the framework will treat low-confidence passes as failures".
const MIN_CONFIDENCE: f64 = 0.7;

const EVALUATION_SYSTEM_PROMPT: &str = "You are a QA assertion evaluator. Your job is to look at a web page's current state and determine whether a stated intent has been satisfied.

You will receive:
- A screenshot of the page
- The current page URL
- A text excerpt from the page
- An intent describing the expected outcome

CRITICAL: Return ONLY valid JSON. No markdown fences, no comments, no text before or after the JSON object.

Return exactly this JSON structure:

{\"passed\": true, \"confidence\": 0.95, \"reasoning\": \"Brief explanation of why the intent was or was not satisfied\"}

Fields:
- passed: boolean — true if the intent is clearly satisfied by the page state, false otherwise
- confidence: float 0.0-1.0 — how confident you are in the verdict
- reasoning: string — one or two sentences explaining your judgment

Guidelines:
- Evaluate the INTENT holistically: consider the URL, visible UI elements, page content, and screenshot together.
- Be strict but fair: if the page clearly shows the intended outcome was achieved (e.g., navigated to a dashboard after login, form was submitted and new content appeared), return passed: true.
- If the page shows an error state, is still on the same form, or shows no evidence the intent was met, return passed: false.
- Do NOT require specific text like \"success\" or \"welcome\" — focus on whether the functional outcome was achieved.
- Set confidence below 0.7 if the evidence is ambiguous. The framework will treat low-confidence passes as failures.";

fn build_evaluation_prompt(intent: &str, current_url: &str, page_text_snippet: &str) -> String {
    let truncated: String = page_text_snippet.chars().take(MAX_TEXT_CHARS).collect();
    format!(
        "## Intent to Verify\n\n{intent}\n\n## Current URL\n\n{current_url}\n\n\
         ## Page Text (excerpt)\n\n{truncated}\n\nReturn your verdict as a single JSON object."
    )
}

#[derive(Deserialize)]
struct EvaluationVerdict {
    passed: bool,
    confidence: f64,
    reasoning: String,
}

pub async fn check_ai_evaluate(
    page: &dyn PageHandle,
    llm: &dyn LlmClient,
    intent: &str,
) -> AssertionCheckResult {
    let current_url = page.url().await;
    let page_text = match page.text_content(None).await {
        Ok(text) => text,
        Err(e) => return AssertionCheckResult::fail(format!("could not read page text: {e}")),
    };
    let screenshot = match page.screenshot(false).await {
        Ok(bytes) => bytes,
        Err(e) => return AssertionCheckResult::fail(format!("could not capture screenshot: {e}")),
    };
    let image_base64 = BASE64.encode(&screenshot);

    let prompt = build_evaluation_prompt(intent, &current_url, &page_text);
    let raw = match llm.complete_with_image(EVALUATION_SYSTEM_PROMPT, &prompt, &image_base64, MAX_TOKENS).await {
        Ok(text) => text,
        Err(e) => return AssertionCheckResult::fail(format!("ai evaluation request failed: {e}")),
    };

    let parsed: EvaluationVerdict = match qa_llm::parse_json_response(&raw).and_then(|v| {
        serde_json::from_value(v).map_err(|e| qa_llm::LlmError::InvalidJson(e.to_string()))
    }) {
        Ok(v) => v,
        Err(e) => return AssertionCheckResult::fail(format!("ai evaluation returned unparseable verdict: {e}")),
    };

    if parsed.confidence < MIN_CONFIDENCE {
        return AssertionCheckResult::fail(format!(
            "ai evaluation confidence {:.2} below threshold {:.2}: {}",
            parsed.confidence, MIN_CONFIDENCE, parsed.reasoning
        ));
    }

    if parsed.passed {
        AssertionCheckResult::pass(parsed.reasoning)
    } else {
        AssertionCheckResult::fail(parsed.reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_truncates_page_text_to_three_thousand_chars() {
        let long_text = "a".repeat(5000);
        let prompt = build_evaluation_prompt("intent", "http://x", &long_text);
        let excerpt_start = prompt.find("## Page Text (excerpt)\n\n").unwrap() + "## Page Text (excerpt)\n\n".len();
        let excerpt = &prompt[excerpt_start..];
        let excerpt_end = excerpt.find("\n\nReturn your verdict").unwrap();
        assert_eq!(&excerpt[..excerpt_end], "a".repeat(MAX_TEXT_CHARS));
    }
}
