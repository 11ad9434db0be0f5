//! Test plan validation. Grounded on
//! `examples/original_source/src/planner/schema_validator.py`.

use std::collections::HashSet;

use crate::types::TestPlan;

const VALID_CATEGORIES: &[&str] = &["functional", "visual", "security"];
const VALID_ACTION_TYPES: &[&str] = &[
    "navigate", "click", "fill", "select", "hover", "scroll", "wait", "screenshot", "keyboard",
];
/// `page_title_contains` and `page_loaded` are accepted here even though the
/// planning prompt's enum doesn't advertise them to the model, mirroring the
/// original validator's permissiveness.
const VALID_ASSERTION_TYPES: &[&str] = &[
    "element_visible", "element_hidden", "text_contains", "text_equals", "text_matches",
    "url_matches", "screenshot_diff", "element_count", "network_request_made",
    "no_console_errors", "response_status", "ai_evaluate", "page_title_contains", "page_loaded",
];

/// Validates a test plan and returns a list of error messages. Each message
/// is prefixed with the offending `test_id` so the caller can filter test
/// cases out of the plan by substring match.
pub fn validate_test_plan(plan: &TestPlan) -> Vec<String> {
    let mut errors = Vec::new();

    if plan.test_cases.is_empty() {
        errors.push("Test plan has no test cases".to_string());
        return errors;
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    for tc in &plan.test_cases {
        if seen_ids.contains(tc.test_id.as_str()) {
            errors.push(format!("Duplicate test_id: {}", tc.test_id));
        }
        seen_ids.insert(tc.test_id.as_str());

        if !VALID_CATEGORIES.contains(&tc.category.as_str()) {
            errors.push(format!("{}: invalid category '{}'", tc.test_id, tc.category));
        }

        if !(1..=5).contains(&tc.priority) {
            errors.push(format!("{}: priority must be 1-5, got {}", tc.test_id, tc.priority));
        }

        if tc.steps.is_empty() {
            errors.push(format!("{}: no steps defined", tc.test_id));
        }

        for (i, action) in tc.all_actions().enumerate() {
            if !VALID_ACTION_TYPES.contains(&action.action_type.as_str()) {
                errors.push(format!(
                    "{} step {}: invalid action_type '{}'",
                    tc.test_id, i, action.action_type
                ));
            }
            let needs_selector = matches!(action.action_type.as_str(), "click" | "fill" | "select" | "hover");
            if needs_selector && action.selector.as_deref().unwrap_or("").is_empty() {
                errors.push(format!(
                    "{} step {}: {} requires a selector",
                    tc.test_id, i, action.action_type
                ));
            }
            if action.action_type == "fill" && action.value.as_deref().unwrap_or("").is_empty() {
                errors.push(format!("{} step {}: fill requires a value", tc.test_id, i));
            }
        }

        for (i, assertion) in tc.assertions.iter().enumerate() {
            if !VALID_ASSERTION_TYPES.contains(&assertion.assertion_type.as_str()) {
                errors.push(format!(
                    "{} assertion {}: invalid type '{}'",
                    tc.test_id, i, assertion.assertion_type
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Assertion, TestCase};

    fn valid_test_case() -> TestCase {
        TestCase {
            test_id: "tc_1".to_string(),
            steps: vec![Action {
                action_type: "navigate".to_string(),
                value: Some("https://example.com".to_string()),
                ..Default::default()
            }],
            assertions: vec![Assertion {
                assertion_type: "url_matches".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn empty_plan_is_rejected() {
        let plan = TestPlan::default();
        let errors = validate_test_plan(&plan);
        assert_eq!(errors, vec!["Test plan has no test cases".to_string()]);
    }

    #[test]
    fn valid_plan_has_no_errors() {
        let plan = TestPlan {
            test_cases: vec![valid_test_case()],
            ..Default::default()
        };
        assert!(validate_test_plan(&plan).is_empty());
    }

    #[test]
    fn flags_missing_selector_and_duplicate_ids() {
        let mut tc = valid_test_case();
        tc.steps.push(Action {
            action_type: "click".to_string(),
            ..Default::default()
        });
        let plan = TestPlan {
            test_cases: vec![tc.clone(), tc],
            ..Default::default()
        };
        let errors = validate_test_plan(&plan);
        assert!(errors.iter().any(|e| e.contains("Duplicate test_id")));
        assert!(errors.iter().any(|e| e.contains("requires a selector")));
    }
}
