//! Run-to-run regression detection (component L). Grounded on
//! `examples/original_source/src/reporter/regression_detector.py`.

use std::collections::HashMap;

use qa_core_types::RunResult;
use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub struct Regression {
    pub test_name: String,
    pub category: String,
    pub previous_result: String,
    pub current_result: String,
    pub failure_reason: Option<String>,
}

/// Compares two runs by test name and flags tests that moved from `pass` in
/// `previous` to `fail` or `error` in `current`.
pub fn detect_regressions(previous: &RunResult, current: &RunResult) -> Vec<Regression> {
    let prev_map: HashMap<&str, &qa_core_types::TestResult> = previous
        .test_results
        .iter()
        .map(|r| (r.test_name.as_str(), r))
        .collect();

    let mut regressions = Vec::new();
    for result in &current.test_results {
        if let Some(prev) = prev_map.get(result.test_name.as_str()) {
            if prev.result == "pass" && (result.result == "fail" || result.result == "error") {
                regressions.push(Regression {
                    test_name: result.test_name.clone(),
                    category: result.category.clone(),
                    previous_result: prev.result.clone(),
                    current_result: result.result.clone(),
                    failure_reason: result.failure_reason.clone(),
                });
            }
        }
    }

    if !regressions.is_empty() {
        warn!("detected {} regressions", regressions.len());
    }
    regressions
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_core_types::TestResult;

    fn result(test_name: &str, category: &str, result: &str) -> TestResult {
        TestResult {
            test_name: test_name.to_string(),
            category: category.to_string(),
            result: result.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn flags_pass_to_fail_transition() {
        let previous = RunResult {
            test_results: vec![result("checkout", "functional", "pass")],
            ..Default::default()
        };
        let current = RunResult {
            test_results: vec![result("checkout", "functional", "fail")],
            ..Default::default()
        };
        let regressions = detect_regressions(&previous, &current);
        assert_eq!(regressions.len(), 1);
        assert_eq!(regressions[0].test_name, "checkout");
    }

    #[test]
    fn ignores_tests_that_were_already_failing() {
        let previous = RunResult {
            test_results: vec![result("checkout", "functional", "fail")],
            ..Default::default()
        };
        let current = RunResult {
            test_results: vec![result("checkout", "functional", "fail")],
            ..Default::default()
        };
        assert!(detect_regressions(&previous, &current).is_empty());
    }

    #[test]
    fn ignores_tests_missing_from_previous_run() {
        let previous = RunResult::default();
        let current = RunResult {
            test_results: vec![result("checkout", "functional", "fail")],
            ..Default::default()
        };
        assert!(detect_regressions(&previous, &current).is_empty());
    }
}
