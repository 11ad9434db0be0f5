/// Outcome of a single assertion check. Distinct from `qa_core_types::AssertionResult`
/// (the persisted run-record shape) — the executor folds this into that record.
#[derive(Clone, Debug)]
pub struct AssertionCheckResult {
    pub passed: bool,
    pub message: String,
}

impl AssertionCheckResult {
    pub fn pass(message: impl Into<String>) -> Self {
        Self { passed: true, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { passed: false, message: message.into() }
    }
}
