//! `{{$variable}}` resolution — Postman-style dynamic tokens in action
//! values. Grounded on
//! `examples/original_source/src/executor/action_runner.py`'s
//! `resolve_dynamic_vars_for_test_case`.

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use qa_planner::{Action, TestCase};

fn build_dynamic_vars() -> HashMap<&'static str, String> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    HashMap::from([("timestamp", timestamp.to_string())])
}

fn resolve_dynamic_vars(value: &str, resolved: &HashMap<&'static str, String>) -> String {
    let re = Regex::new(r"\{\{\$(\w+)\}\}").unwrap();
    re.replace_all(value, |caps: &regex::Captures| {
        let name = &caps[1];
        match resolved.get(name) {
            Some(v) => v.clone(),
            None => {
                warn!("unknown dynamic variable: {{{{${name}}}}}");
                caps[0].to_string()
            }
        }
    })
    .into_owned()
}

fn resolve_slice(actions: &mut [Action], resolved: &HashMap<&'static str, String>, re: &Regex) {
    for action in actions.iter_mut() {
        if let Some(value) = &action.value {
            if re.is_match(value) {
                action.value = Some(resolve_dynamic_vars(value, resolved));
            }
        }
    }
}

/// Resolves all `{{$variable}}` tokens across a test case's preconditions and
/// steps in place, using a single snapshot so the same `{{$timestamp}}`
/// value appears in every action of the test case (e.g. a value created in
/// preconditions and referenced again in steps).
pub fn resolve_dynamic_vars_for_test_case(test_case: &mut TestCase) {
    let resolved = build_dynamic_vars();
    let re = Regex::new(r"\{\{\$(\w+)\}\}").unwrap();
    resolve_slice(&mut test_case.preconditions, &resolved, &re);
    resolve_slice(&mut test_case.steps, &resolved, &re);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_timestamp_used_across_preconditions_and_steps() {
        let mut test_case = TestCase {
            preconditions: vec![Action { value: Some("user_{{$timestamp}}".to_string()), ..Default::default() }],
            steps: vec![Action { value: Some("ref_{{$timestamp}}".to_string()), ..Default::default() }],
            ..Default::default()
        };
        resolve_dynamic_vars_for_test_case(&mut test_case);
        let first = test_case.preconditions[0].value.clone().unwrap();
        let second = test_case.steps[0].value.clone().unwrap();
        let first_ts = first.strip_prefix("user_").unwrap();
        let second_ts = second.strip_prefix("ref_").unwrap();
        assert_eq!(first_ts, second_ts);
        assert!(!first.contains("{{$"));
    }

    #[test]
    fn leaves_unknown_variable_token_untouched() {
        let mut test_case = TestCase {
            steps: vec![Action { value: Some("{{$bogus}}".to_string()), ..Default::default() }],
            ..Default::default()
        };
        resolve_dynamic_vars_for_test_case(&mut test_case);
        assert_eq!(test_case.steps[0].value.as_deref(), Some("{{$bogus}}"));
    }
}
