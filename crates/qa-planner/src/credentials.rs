//! Auth placeholder injection/removal. Grounded on
//! `examples/original_source/src/planner/planner.py`'s `_inject_credentials`.

use qa_config::AuthConfig;
use tracing::{debug, info};

use crate::types::{TestCase, TestPlan};

pub const AUTH_PLACEHOLDER_USERNAME: &str = "{{auth_username}}";
pub const AUTH_PLACEHOLDER_PASSWORD: &str = "{{auth_password}}";
pub const AUTH_PLACEHOLDER_LOGIN_URL: &str = "{{auth_login_url}}";

fn has_auth_placeholders(tc: &TestCase) -> bool {
    let tokens = [AUTH_PLACEHOLDER_USERNAME, AUTH_PLACEHOLDER_PASSWORD, AUTH_PLACEHOLDER_LOGIN_URL];
    let action_hit = tc.all_actions().any(|a| {
        a.value.as_deref().map(|v| tokens.iter().any(|t| v.contains(t))).unwrap_or(false)
    });
    if action_hit {
        return true;
    }
    tc.assertions.iter().any(|a| {
        a.expected_value.as_deref().map(|v| tokens.iter().any(|t| v.contains(t))).unwrap_or(false)
    })
}

fn mask(value: &str, password: &str) -> String {
    if password.is_empty() {
        value.to_string()
    } else {
        value.replace(password, "***")
    }
}

/// Replaces auth placeholder tokens with real credentials from config. When
/// no auth is configured, test cases still carrying placeholders are
/// dropped as a safety net so unresolved `{{auth_password}}` literals never
/// reach the executor.
pub fn inject_credentials(mut plan: TestPlan, auth: Option<&AuthConfig>) -> TestPlan {
    let Some(auth) = auth else {
        let original_count = plan.test_cases.len();
        plan.test_cases.retain(|tc| !has_auth_placeholders(tc));
        let removed = original_count - plan.test_cases.len();
        if removed > 0 {
            info!("removed {removed} test case(s) with auth placeholders (no auth configured)");
        }
        return plan;
    };

    let substitutions = [
        (AUTH_PLACEHOLDER_USERNAME, auth.username.as_str()),
        (AUTH_PLACEHOLDER_PASSWORD, auth.password.as_str()),
        (AUTH_PLACEHOLDER_LOGIN_URL, auth.login_url.as_str()),
    ];

    let mut sub_count = 0u32;

    for tc in &mut plan.test_cases {
        let test_id = tc.test_id.clone();
        for action in tc.all_actions_mut() {
            if let Some(original) = action.value.clone() {
                let mut new_value = original.clone();
                for (token, real_value) in &substitutions {
                    if new_value.contains(token) {
                        new_value = new_value.replace(token, real_value);
                    }
                }
                if new_value != original {
                    debug!(
                        "credential injection [{test_id}]: '{original}' -> '{}'",
                        mask(&new_value, &auth.password)
                    );
                    action.value = Some(new_value);
                    sub_count += 1;
                }
            }
        }

        for assertion in &mut tc.assertions {
            if let Some(original) = assertion.expected_value.clone() {
                let mut new_value = original.clone();
                for (token, real_value) in &substitutions {
                    if new_value.contains(token) {
                        new_value = new_value.replace(token, real_value);
                    }
                }
                if new_value != original {
                    debug!(
                        "credential injection [{test_id} assertion]: '{original}' -> '{}'",
                        mask(&new_value, &auth.password)
                    );
                    assertion.expected_value = Some(new_value);
                    sub_count += 1;
                }
            }
        }
    }

    if sub_count > 0 {
        info!("injected credentials into {sub_count} action/assertion fields");
    } else {
        debug!("no credential placeholders found in plan");
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Assertion};

    fn plan_with_placeholder() -> TestPlan {
        TestPlan {
            test_cases: vec![TestCase {
                test_id: "tc_login".to_string(),
                steps: vec![Action {
                    action_type: "fill".to_string(),
                    value: Some(AUTH_PLACEHOLDER_PASSWORD.to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn substitutes_placeholder_when_auth_configured() {
        let auth = AuthConfig {
            username: "qa@example.com".to_string(),
            password: "s3cret".to_string(),
            login_url: "https://example.com/login".to_string(),
            ..Default::default()
        };
        let plan = inject_credentials(plan_with_placeholder(), Some(&auth));
        assert_eq!(plan.test_cases[0].steps[0].value.as_deref(), Some("s3cret"));
    }

    #[test]
    fn drops_test_case_with_placeholder_when_no_auth() {
        let plan = inject_credentials(plan_with_placeholder(), None);
        assert!(plan.test_cases.is_empty());
    }

    #[test]
    fn keeps_test_cases_without_placeholders_when_no_auth() {
        let mut plan = plan_with_placeholder();
        plan.test_cases.push(TestCase {
            test_id: "tc_plain".to_string(),
            steps: vec![Action {
                action_type: "navigate".to_string(),
                value: Some("https://example.com".to_string()),
                ..Default::default()
            }],
            assertions: vec![Assertion::default()],
            ..Default::default()
        });
        let plan = inject_credentials(plan, None);
        assert_eq!(plan.test_cases.len(), 1);
        assert_eq!(plan.test_cases[0].test_id, "tc_plain");
    }
}
