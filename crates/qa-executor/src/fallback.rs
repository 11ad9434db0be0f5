//! AI-assisted recovery when a test step fails mid-run. Grounded on
//! `examples/original_source/src/executor/fallback.py` and
//! `examples/original_source/src/ai/prompts/fallback.py`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qa_core_types::FallbackRecord;
use qa_llm::LlmClient;
use qa_planner::Action;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

const MAX_TOKENS: u32 = 1000;
const MAX_DOM_CHARS: usize = 2000;
const MAX_CONSOLE_ERRORS: usize = 10;

const FALLBACK_SYSTEM_PROMPT: &str = "You are an expert QA engineer AI assisting with automated browser testing. A test step has encountered an unexpected state.

CRITICAL: Return ONLY valid JSON. No markdown fences, no comments, no text before or after the JSON object.

Return exactly this JSON structure:

{\"decision\": \"retry\", \"new_selector\": \"css-selector-or-null\", \"new_action\": null, \"reasoning\": \"brief explanation\"}

Fields:
- decision: one of \"retry\", \"skip\", \"abort\", \"adapt\"
- new_selector: corrected CSS selector string (for retry), or null
- new_action: null, or {\"action_type\": \"click\", \"selector\": \"...\", \"value\": null, \"description\": \"...\"}
- reasoning: one sentence explaining your decision

Decision guidelines:
- retry: Element likely exists but selector is wrong. Provide corrected selector in new_selector.
- adapt: Page needs a different action (e.g. dismiss modal first). Provide new_action.
- skip: Step cannot be completed but test can continue.
- abort: Test is in unrecoverable state.

Prefer skip over abort. Only abort if the test truly cannot produce meaningful results.";

fn build_fallback_prompt(test_context: &str, dom_snippet: &str, console_errors: &[String], original_action_desc: &str, original_selector: &str) -> String {
    let errors_text = if console_errors.is_empty() {
        "None".to_string()
    } else {
        console_errors.iter().take(MAX_CONSOLE_ERRORS).cloned().collect::<Vec<_>>().join("\n")
    };
    let truncated_dom: String = dom_snippet.chars().take(MAX_DOM_CHARS).collect();
    format!(
        "Test Context: {test_context}\n\nOriginal Action: {original_action_desc}\nSelector: {original_selector}\n\n\
         DOM Snippet:\n{truncated_dom}\n\nConsole Errors: {errors_text}\n\nReturn your decision as a single JSON object."
    )
}

#[derive(Clone, Debug)]
pub struct FallbackResponse {
    pub decision: String,
    pub new_selector: Option<String>,
    pub new_action: Option<Action>,
    pub reasoning: String,
}

#[derive(Deserialize, Default)]
struct RawFallbackResponse {
    decision: Option<String>,
    new_selector: Option<String>,
    new_action: Option<Action>,
    reasoning: Option<String>,
}

pub struct FallbackHandler<'a> {
    llm: &'a dyn LlmClient,
    max_calls: u32,
    call_count: u32,
}

impl<'a> FallbackHandler<'a> {
    pub fn new(llm: &'a dyn LlmClient, max_calls_per_test: u32) -> Self {
        Self { llm, max_calls: max_calls_per_test, call_count: 0 }
    }

    pub fn budget_remaining(&self) -> u32 {
        self.max_calls.saturating_sub(self.call_count)
    }

    /// Requests AI guidance for a failed step. `screenshot_bytes` is the
    /// failed-step screenshot, when one was captured.
    pub async fn request_fallback(
        &mut self,
        test_context: &str,
        screenshot_bytes: Option<&[u8]>,
        dom_snippet: &str,
        console_errors: &[String],
        original_action: &Action,
    ) -> FallbackResponse {
        if self.call_count >= self.max_calls {
            warn!("fallback budget exhausted");
            return FallbackResponse {
                decision: "abort".to_string(),
                new_selector: None,
                new_action: None,
                reasoning: "Fallback budget exhausted".to_string(),
            };
        }
        self.call_count += 1;
        info!("AI fallback call {}/{} for failed step", self.call_count, self.max_calls);
        debug!("fallback context: {test_context}");
        debug!("fallback original selector: {:?}", original_action.selector);

        let user_message = build_fallback_prompt(
            test_context,
            dom_snippet,
            console_errors,
            &original_action.description,
            original_action.selector.as_deref().unwrap_or(""),
        );

        let raw_result = match screenshot_bytes {
            Some(bytes) => {
                let image_base64 = BASE64.encode(bytes);
                self.llm.complete_with_image(FALLBACK_SYSTEM_PROMPT, &user_message, &image_base64, MAX_TOKENS).await
            }
            None => self.llm.complete(FALLBACK_SYSTEM_PROMPT, &user_message, MAX_TOKENS).await,
        };

        let raw = match raw_result {
            Ok(text) => text,
            Err(e) => {
                error!("fallback AI call failed: {e}");
                return FallbackResponse {
                    decision: "skip".to_string(),
                    new_selector: None,
                    new_action: None,
                    reasoning: format!("AI call failed: {e}"),
                };
            }
        };

        let parsed: RawFallbackResponse = match qa_llm::parse_json_response(&raw)
            .and_then(|v| serde_json::from_value(v).map_err(|e| qa_llm::LlmError::InvalidJson(e.to_string())))
        {
            Ok(v) => v,
            Err(e) => {
                error!("fallback AI response parse failed: {e}");
                return FallbackResponse {
                    decision: "skip".to_string(),
                    new_selector: None,
                    new_action: None,
                    reasoning: format!("AI response parse failed: {e}"),
                };
            }
        };

        let decision = parsed.decision.unwrap_or_else(|| "skip".to_string());
        let reasoning = parsed.reasoning.unwrap_or_default();
        debug!("fallback AI decision: {decision} — {reasoning}");
        if let Some(new_action) = &parsed.new_action {
            debug!("fallback new action: {} selector={:?}", new_action.action_type, new_action.selector);
        }

        FallbackResponse { decision, new_selector: parsed.new_selector, new_action: parsed.new_action, reasoning }
    }

    pub fn to_record(&self, step_index: usize, original_selector: &str, response: &FallbackResponse) -> FallbackRecord {
        FallbackRecord {
            step_index,
            original_selector: original_selector.to_string(),
            decision: response.decision.clone(),
            new_selector: response.new_selector.clone(),
            reasoning: response.reasoning.clone(),
        }
    }
}
