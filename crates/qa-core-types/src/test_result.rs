//! Shared result records produced by the executor and consumed by the
//! coverage registry and regression detector. Grounded on
//! `examples/original_source/src/models/test_result.py`.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    pub screenshots: Vec<String>,
    pub console_logs: Vec<String>,
    pub network_log: Vec<serde_json::Value>,
    pub dom_snapshot_path: Option<String>,
    pub video_path: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackRecord {
    pub step_index: usize,
    pub original_selector: String,
    /// retry, skip, abort, adapt
    pub decision: String,
    pub new_selector: Option<String>,
    pub reasoning: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StepResult {
    pub step_index: usize,
    pub action_type: String,
    pub selector: Option<String>,
    pub value: Option<String>,
    pub description: String,
    /// pass, fail, skip
    pub status: String,
    pub error_message: Option<String>,
    pub screenshot_path: Option<String>,
}

impl Default for StepResult {
    fn default() -> Self {
        Self {
            step_index: 0,
            action_type: String::new(),
            selector: None,
            value: None,
            description: String::new(),
            status: "pass".to_string(),
            error_message: None,
            screenshot_path: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionResult {
    pub assertion_type: String,
    pub selector: Option<String>,
    pub expected_value: Option<String>,
    pub description: String,
    pub passed: bool,
    pub actual_value: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResult {
    pub test_id: String,
    pub test_name: String,
    pub description: String,
    pub category: String,
    pub priority: u32,
    pub target_page_id: String,
    /// page_id derived from the browser URL after steps execute.
    pub actual_page_id: String,
    pub actual_url: String,
    pub coverage_signature: String,
    /// pass, fail, skip, error
    pub result: String,
    pub duration_seconds: f64,
    pub failure_reason: Option<String>,
    pub evidence: Evidence,
    pub fallback_records: Vec<FallbackRecord>,
    pub precondition_results: Vec<StepResult>,
    pub step_results: Vec<StepResult>,
    pub assertion_results: Vec<AssertionResult>,
    pub assertions_passed: u32,
    pub assertions_failed: u32,
    pub assertions_total: u32,
    /// Set when the test failed on its first run but passed on a
    /// re-run in a fresh session; the overall `result` stays `fail`.
    pub potentially_flaky: bool,
}

impl Default for TestResult {
    fn default() -> Self {
        Self {
            test_id: String::new(),
            test_name: String::new(),
            description: String::new(),
            category: String::new(),
            priority: 3,
            target_page_id: String::new(),
            actual_page_id: String::new(),
            actual_url: String::new(),
            coverage_signature: String::new(),
            result: String::new(),
            duration_seconds: 0.0,
            failure_reason: None,
            evidence: Evidence::default(),
            fallback_records: Vec::new(),
            precondition_results: Vec::new(),
            step_results: Vec::new(),
            assertion_results: Vec::new(),
            assertions_passed: 0,
            assertions_failed: 0,
            assertions_total: 0,
            potentially_flaky: false,
        }
    }
}

impl TestResult {
    /// The page this result should be attributed to for coverage purposes:
    /// prefer where the browser actually ended up over where the plan
    /// targeted, since tests can navigate across pages (login -> dashboard).
    pub fn effective_page_id(&self) -> &str {
        if !self.actual_page_id.is_empty() {
            &self.actual_page_id
        } else if !self.target_page_id.is_empty() {
            &self.target_page_id
        } else {
            &self.test_id
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunResult {
    pub run_id: String,
    pub plan_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub target_url: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duration_seconds: f64,
    pub test_results: Vec<TestResult>,
    pub ai_summary: String,
}
