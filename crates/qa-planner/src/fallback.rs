//! Deterministic test-plan generation used when AI planning is unavailable
//! or its output fails validation. Grounded on
//! `examples/original_source/src/planner/planner.py`'s `_generate_fallback_plan`.

use qa_config::FrameworkConfig;
use qa_site_model::SiteModel;
use uuid::Uuid;

use crate::types::{Action, Assertion, TestCase, TestPlan};

fn test_value_for_type(field_type: &str, name: &str) -> String {
    let name_lower = name.to_lowercase();
    if field_type == "email" || name_lower.contains("email") {
        return "test@example.com".to_string();
    }
    if field_type == "password" || name_lower.contains("password") {
        return "TestP@ssw0rd123".to_string();
    }
    if name_lower.contains("phone") || name_lower.contains("tel") {
        return "+1-555-000-1234".to_string();
    }
    if name_lower.contains("name") {
        return "Test User".to_string();
    }
    if name_lower.contains("url") || name_lower.contains("website") {
        return "https://example.com".to_string();
    }
    if name_lower.contains("zip") || name_lower.contains("postal") {
        return "90210".to_string();
    }
    "Test input value".to_string()
}

fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn generate_fallback_plan(config: &FrameworkConfig, site_model: &SiteModel) -> TestPlan {
    tracing::info!("generating fallback plan (no AI)");
    let mut test_cases = Vec::new();
    let mut tc_num = 0u32;

    for page in &site_model.pages {
        tc_num += 1;
        let title_or_url = if page.title.is_empty() { page.url.clone() } else { page.title.clone() };
        test_cases.push(TestCase {
            test_id: format!("tc_fallback_{tc_num:03}"),
            name: format!("Navigate to {title_or_url}"),
            description: format!("Verify {} loads successfully", page.url),
            category: "functional".to_string(),
            priority: 3,
            target_page_id: page.page_id.clone(),
            coverage_signature: format!("navigate_{}", page.page_id),
            steps: vec![Action {
                action_type: "navigate".to_string(),
                value: Some(page.url.clone()),
                description: format!("Go to {}", page.url),
                ..Default::default()
            }],
            assertions: vec![
                Assertion {
                    assertion_type: "url_matches".to_string(),
                    expected_value: Some(page.url.clone()),
                    description: "URL loaded".to_string(),
                    ..Default::default()
                },
                Assertion {
                    assertion_type: "no_console_errors".to_string(),
                    description: "No console errors".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        if config.categories.iter().any(|c| c == "visual") {
            tc_num += 1;
            test_cases.push(TestCase {
                test_id: format!("tc_fallback_{tc_num:03}"),
                name: format!("Visual check: {title_or_url}"),
                category: "visual".to_string(),
                priority: 4,
                target_page_id: page.page_id.clone(),
                coverage_signature: format!("visual_{}", page.page_id),
                steps: vec![
                    Action {
                        action_type: "navigate".to_string(),
                        value: Some(page.url.clone()),
                        description: format!("Go to {}", page.url),
                        ..Default::default()
                    },
                    Action {
                        action_type: "screenshot".to_string(),
                        description: "Capture page".to_string(),
                        ..Default::default()
                    },
                ],
                assertions: vec![Assertion {
                    assertion_type: "screenshot_diff".to_string(),
                    tolerance: Some(config.visual_diff_tolerance),
                    description: "Compare against baseline".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            });
        }

        for form in &page.forms {
            tc_num += 1;
            let mut steps = vec![Action {
                action_type: "navigate".to_string(),
                value: Some(page.url.clone()),
                description: format!("Go to {}", page.url),
                ..Default::default()
            }];
            for field in &form.fields {
                match field.field_type.as_str() {
                    "text" | "email" | "password" | "textarea" => steps.push(Action {
                        action_type: "fill".to_string(),
                        selector: Some(field.selector.clone()),
                        value: Some(test_value_for_type(&field.field_type, &field.name)),
                        description: format!("Fill {}", field.name),
                    }),
                    "select" => {
                        if let Some(first) = field.options.as_ref().and_then(|o| o.first()) {
                            steps.push(Action {
                                action_type: "select".to_string(),
                                selector: Some(field.selector.clone()),
                                value: Some(first.clone()),
                                description: format!("Select {}", field.name),
                            });
                        }
                    }
                    "checkbox" => steps.push(Action {
                        action_type: "click".to_string(),
                        selector: Some(field.selector.clone()),
                        value: None,
                        description: format!("Check {}", field.name),
                    }),
                    _ => {}
                }
            }
            if !form.submit_selector.is_empty() {
                steps.push(Action {
                    action_type: "click".to_string(),
                    selector: Some(form.submit_selector.clone()),
                    value: None,
                    description: "Submit form".to_string(),
                });
            }

            test_cases.push(TestCase {
                test_id: format!("tc_fallback_{tc_num:03}"),
                name: format!("Submit form on {title_or_url}"),
                category: "functional".to_string(),
                priority: 2,
                target_page_id: page.page_id.clone(),
                coverage_signature: format!("form_submit_{}", form.form_id),
                steps,
                assertions: vec![Assertion {
                    assertion_type: "no_console_errors".to_string(),
                    description: "No errors after submission".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            });
        }
    }

    let estimated_duration_seconds = (test_cases.len() as u64) * 10;
    test_cases.truncate(config.max_tests_per_run);

    TestPlan {
        plan_id: format!("plan_fallback_{}", &Uuid::new_v4().simple().to_string()[..8]),
        generated_at: now_iso(),
        target_url: site_model.base_url.clone(),
        test_cases,
        estimated_duration_seconds,
        coverage_intent: Default::default(),
    }
}
