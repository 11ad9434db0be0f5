//! Runs a single `TestCase` to completion: preconditions, steps (with AI
//! fallback on failure), assertions, and evidence assembly. Grounded on
//! `examples/original_source/src/executor/executor.py`'s `_run_test`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use qa_action_runner::{resolve_dynamic_vars_for_test_case, run_action};
use qa_assertions::check_assertion;
use qa_browser_session::BrowserSession;
use qa_config::FrameworkConfig;
use qa_core_types::{page_id_from_url, AssertionResult as AssertionResultRecord, StepResult, TestResult};
use qa_llm::LlmClient;
use qa_planner::TestCase;
use tracing::warn;

use crate::evidence::{format_console_logs, EvidenceCollector};
use crate::fallback::FallbackHandler;

/// Finds the first `*_screenshot.png` in a baseline directory, mirroring the
/// original's `baseline_dir.glob("*_screenshot.png")` "use whatever's there"
/// lookup.
fn find_baseline_screenshot(baseline_dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(baseline_dir).ok()?;
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with("_screenshot.png")))
}

pub struct RunTestParams<'a> {
    pub config: &'a FrameworkConfig,
    pub llm: Option<&'a dyn LlmClient>,
    pub evidence_root: &'a Path,
    pub baseline_dir: Option<&'a Path>,
}

pub async fn run_test(session: &dyn BrowserSession, test_case: &TestCase, params: &RunTestParams<'_>) -> TestResult {
    let mut tc = test_case.clone();
    resolve_dynamic_vars_for_test_case(&mut tc);

    let test_start = Instant::now();
    let evidence_dir = params.evidence_root.join(&tc.test_id);
    let mut collector = EvidenceCollector::new(evidence_dir.clone());
    let mut fallback_handler = params.llm.map(|llm| FallbackHandler::new(llm, params.config.ai_max_fallback_calls_per_test));

    let mut screenshots = Vec::new();
    let mut fallback_records = Vec::new();
    let mut precondition_results = Vec::new();
    let mut step_results = Vec::new();

    let page = match session.new_page().await {
        Ok(page) => page,
        Err(e) => return error_result(&tc, test_start, format!("failed to open page: {e}")),
    };

    let action_timeout = Duration::from_secs(tc.timeout_seconds.max(1) as u64);

    if let Some(s) = collector.take_screenshot(page.as_ref(), "initial").await {
        screenshots.push(s);
    }

    for (i, action) in tc.preconditions.iter().enumerate() {
        match run_action(page.as_ref(), action, action_timeout, true).await {
            Ok(()) => {
                let shot = collector.take_screenshot(page.as_ref(), &format!("precond_{i}")).await;
                if let Some(s) = &shot {
                    screenshots.push(s.clone());
                }
                precondition_results.push(StepResult {
                    step_index: i,
                    action_type: action.action_type.clone(),
                    selector: action.selector.clone(),
                    value: action.value.clone(),
                    description: action.description.clone(),
                    status: "pass".to_string(),
                    screenshot_path: shot,
                    ..Default::default()
                });
            }
            Err(e) => {
                warn!("precondition {i} failed: {e}");
                let shot = collector.take_screenshot(page.as_ref(), &format!("precond_{i}_fail")).await;
                if let Some(s) = &shot {
                    screenshots.push(s.clone());
                }
                precondition_results.push(StepResult {
                    step_index: i,
                    action_type: action.action_type.clone(),
                    selector: action.selector.clone(),
                    value: action.value.clone(),
                    description: action.description.clone(),
                    status: "fail".to_string(),
                    error_message: Some(e.to_string()),
                    screenshot_path: shot,
                });
            }
        }
    }

    let mut aborted = false;
    for (step_idx, action) in tc.steps.iter().enumerate() {
        if aborted {
            step_results.push(StepResult {
                step_index: step_idx,
                action_type: action.action_type.clone(),
                selector: action.selector.clone(),
                value: action.value.clone(),
                description: action.description.clone(),
                status: "skip".to_string(),
                error_message: Some("Skipped due to earlier abort".to_string()),
                screenshot_path: None,
            });
            continue;
        }

        match run_action(page.as_ref(), action, action_timeout, true).await {
            Ok(()) => {
                let shot = collector.take_screenshot(page.as_ref(), &format!("step_{step_idx}")).await;
                if let Some(s) = &shot {
                    screenshots.push(s.clone());
                }
                step_results.push(StepResult {
                    step_index: step_idx,
                    action_type: action.action_type.clone(),
                    selector: action.selector.clone(),
                    value: action.value.clone(),
                    description: action.description.clone(),
                    status: "pass".to_string(),
                    screenshot_path: shot,
                    ..Default::default()
                });
            }
            Err(e) => {
                let fail_shot = collector.take_screenshot(page.as_ref(), &format!("step_{step_idx}_fail")).await;
                if let Some(s) = &fail_shot {
                    screenshots.push(s.clone());
                }

                let mut recovered = false;
                if let Some(handler) = fallback_handler.as_mut() {
                    if handler.budget_remaining() > 0 {
                        let dom = page.content().await.unwrap_or_default();
                        let dom_snippet: String = dom.chars().take(3000).collect();
                        let console_logs = format_console_logs(page.as_ref());
                        let recent_errors: Vec<String> = console_logs.iter().rev().take(5).rev().cloned().collect();
                        let screenshot_bytes = match &fail_shot {
                            Some(path) => std::fs::read(path).ok(),
                            None => None,
                        };

                        let fb = handler
                            .request_fallback(
                                &format!("Test: {}\nStep {step_idx}: {}", tc.name, action.description),
                                screenshot_bytes.as_deref(),
                                &dom_snippet,
                                &recent_errors,
                                action,
                            )
                            .await;
                        fallback_records.push(handler.to_record(step_idx, action.selector.as_deref().unwrap_or(""), &fb));

                        match fb.decision.as_str() {
                            "retry" if fb.new_selector.is_some() => {
                                let mut retry_action = action.clone();
                                retry_action.selector = fb.new_selector.clone();
                                if run_action(page.as_ref(), &retry_action, action_timeout, true).await.is_ok() {
                                    let retry_shot = collector.take_screenshot(page.as_ref(), &format!("step_{step_idx}_retry")).await;
                                    if let Some(s) = &retry_shot {
                                        screenshots.push(s.clone());
                                    }
                                    step_results.push(StepResult {
                                        step_index: step_idx,
                                        action_type: action.action_type.clone(),
                                        selector: fb.new_selector.clone(),
                                        value: action.value.clone(),
                                        description: format!("{} (retried with new selector)", action.description),
                                        status: "pass".to_string(),
                                        screenshot_path: retry_shot,
                                        ..Default::default()
                                    });
                                    recovered = true;
                                }
                            }
                            "adapt" => {
                                if let Some(new_action) = fb.new_action.clone() {
                                    if run_action(page.as_ref(), &new_action, action_timeout, true).await.is_ok() {
                                        let adapt_shot = collector.take_screenshot(page.as_ref(), &format!("step_{step_idx}_adapt")).await;
                                        if let Some(s) = &adapt_shot {
                                            screenshots.push(s.clone());
                                        }
                                        step_results.push(StepResult {
                                            step_index: step_idx,
                                            action_type: new_action.action_type.clone(),
                                            selector: new_action.selector.clone(),
                                            value: new_action.value.clone(),
                                            description: format!("{} (adapted: {})", action.description, fb.reasoning),
                                            status: "pass".to_string(),
                                            screenshot_path: adapt_shot,
                                            ..Default::default()
                                        });
                                        recovered = true;
                                    }
                                }
                            }
                            "abort" => {
                                step_results.push(StepResult {
                                    step_index: step_idx,
                                    action_type: action.action_type.clone(),
                                    selector: action.selector.clone(),
                                    value: action.value.clone(),
                                    description: action.description.clone(),
                                    status: "fail".to_string(),
                                    error_message: Some(format!("Aborted: {}", fb.reasoning)),
                                    screenshot_path: fail_shot.clone(),
                                });
                                aborted = true;
                                continue;
                            }
                            _ => {}
                        }
                    }
                }

                if !recovered {
                    step_results.push(StepResult {
                        step_index: step_idx,
                        action_type: action.action_type.clone(),
                        selector: action.selector.clone(),
                        value: action.value.clone(),
                        description: action.description.clone(),
                        status: "fail".to_string(),
                        error_message: Some(e.to_string()),
                        screenshot_path: fail_shot,
                    });
                }
            }
        }
    }

    let baseline_image_path = params.baseline_dir.and_then(find_baseline_screenshot);
    let console_logs = format_console_logs(page.as_ref());
    let network_log = page.network_log();

    let mut assertion_results = Vec::new();
    let mut passed_count = 0u32;
    let mut failed_count = 0u32;
    let mut failure_reasons = Vec::new();

    for assertion in &tc.assertions {
        let result = check_assertion(
            page.as_ref(),
            assertion,
            &console_logs,
            &network_log,
            params.config,
            baseline_image_path.as_deref(),
            params.llm,
        )
        .await;

        if result.passed {
            passed_count += 1;
        } else {
            failed_count += 1;
            failure_reasons.push(format!("{}: {}", assertion.description, result.message));
        }

        assertion_results.push(AssertionResultRecord {
            assertion_type: assertion.assertion_type.clone(),
            selector: assertion.selector.clone(),
            expected_value: assertion.expected_value.clone(),
            description: assertion.description.clone(),
            passed: result.passed,
            actual_value: None,
            message: result.message,
        });
    }

    if let Some(s) = collector.take_screenshot(page.as_ref(), "final").await {
        screenshots.push(s);
    }
    collector.save_logs(&console_logs, &network_log);

    let status = if aborted && failed_count == 0 {
        "error"
    } else if failed_count == 0 && !aborted {
        "pass"
    } else {
        "fail"
    };

    let actual_url = page.url().await;
    let actual_page_id = page_id_from_url(&actual_url).unwrap_or_default();

    TestResult {
        test_id: tc.test_id.clone(),
        test_name: tc.name.clone(),
        description: tc.description.clone(),
        category: tc.category.clone(),
        priority: tc.priority,
        target_page_id: tc.target_page_id.clone(),
        actual_page_id,
        actual_url,
        coverage_signature: tc.coverage_signature.clone(),
        result: status.to_string(),
        duration_seconds: test_start.elapsed().as_secs_f64(),
        failure_reason: (!failure_reasons.is_empty()).then(|| failure_reasons.join("; ")),
        evidence: collector.build_evidence(screenshots, console_logs, &network_log),
        fallback_records,
        precondition_results,
        step_results,
        assertion_results,
        assertions_passed: passed_count,
        assertions_failed: failed_count,
        assertions_total: tc.assertions.len() as u32,
        potentially_flaky: false,
    }
}

fn error_result(tc: &TestCase, test_start: Instant, reason: String) -> TestResult {
    TestResult {
        test_id: tc.test_id.clone(),
        test_name: tc.name.clone(),
        description: tc.description.clone(),
        category: tc.category.clone(),
        priority: tc.priority,
        target_page_id: tc.target_page_id.clone(),
        coverage_signature: tc.coverage_signature.clone(),
        result: "error".to_string(),
        duration_seconds: test_start.elapsed().as_secs_f64(),
        failure_reason: Some(reason),
        ..Default::default()
    }
}
