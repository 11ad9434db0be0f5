//! Assertion checking (component J): dispatches each `Assertion` to its
//! check function, including the LLM-judged `ai_evaluate` kind and the
//! pixel-diff `screenshot_diff` kind. Grounded on
//! `examples/original_source/src/executor/assertion_checker.py` and
//! `examples/original_source/src/ai/prompts/evaluation.py`.

mod ai_evaluate;
mod checks;
mod screenshot_diff;
mod types;

pub use checks::check_assertion;
pub use types::AssertionCheckResult;
