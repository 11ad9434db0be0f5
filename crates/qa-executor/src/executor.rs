//! Top-level test-plan execution: priority/plan ordering, lazy smart-auth
//! seeding, a bounded-concurrency worker pool, and flake re-runs.
//!
//! The original `execute()` (grounded on
//! `examples/original_source/src/executor/executor.py`) runs one test at a
//! time, grouped by page so a single browser context can be reused across a
//! page's tests. This framework's resource model isolates each test in its
//! own session instead (session boundary = test boundary), which removes the
//! reason to group by page and opens the door to running independent tests
//! concurrently up to `max_parallel_contexts`: a bounded `Semaphore` gates how
//! many workers run at once, each worker owns its own session and reports its
//! `TestResult` back over an `mpsc` channel, and the registry/frontier are
//! never shared across workers — matching the teacher's `scheduler` crate
//! idiom of bounded channels for cross-task result collection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use qa_browser_session::{BrowserSessionFactory, StorageState};
use qa_config::FrameworkConfig;
use qa_core_types::{RunResult, TestResult};
use qa_llm::LlmClient;
use qa_planner::{TestCase, TestPlan};
use qa_smart_auth::{authenticate_and_capture_state, Credentials, ExplicitSelectors};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::test_runner::{run_test, RunTestParams};

pub struct Executor {
    config: Arc<FrameworkConfig>,
    llm: Option<Arc<dyn LlmClient>>,
    factory: Arc<BrowserSessionFactory>,
}

fn skipped_result(tc: &TestCase, reason: &str) -> TestResult {
    TestResult {
        test_id: tc.test_id.clone(),
        test_name: tc.name.clone(),
        description: tc.description.clone(),
        category: tc.category.clone(),
        priority: tc.priority,
        target_page_id: tc.target_page_id.clone(),
        coverage_signature: tc.coverage_signature.clone(),
        result: "skip".to_string(),
        failure_reason: Some(reason.to_string()),
        ..Default::default()
    }
}

fn errored_result(tc: &TestCase, reason: &str) -> TestResult {
    TestResult {
        test_id: tc.test_id.clone(),
        test_name: tc.name.clone(),
        description: tc.description.clone(),
        category: tc.category.clone(),
        priority: tc.priority,
        target_page_id: tc.target_page_id.clone(),
        coverage_signature: tc.coverage_signature.clone(),
        result: "error".to_string(),
        failure_reason: Some(reason.to_string()),
        ..Default::default()
    }
}

/// One queued unit of work for a spawned worker task. Everything here is
/// owned rather than borrowed so the task can satisfy `tokio::spawn`'s
/// `'static` bound.
struct WorkerJob {
    test_case: TestCase,
    config: Arc<FrameworkConfig>,
    llm: Option<Arc<dyn LlmClient>>,
    factory: Arc<BrowserSessionFactory>,
    auth_storage_state: Option<StorageState>,
    evidence_root: PathBuf,
    baseline_dir: Option<PathBuf>,
    deadline: Instant,
}

async fn run_worker_job(job: WorkerJob) -> TestResult {
    let tc = &job.test_case;
    if Instant::now() >= job.deadline {
        return skipped_result(tc, "execution time budget exceeded");
    }

    let storage = if tc.requires_auth { job.auth_storage_state.clone() } else { None };
    let session = match job.factory.acquire(storage).await {
        Ok(s) => s,
        Err(e) => return errored_result(tc, &format!("failed to open session: {e}")),
    };

    let params = RunTestParams {
        config: job.config.as_ref(),
        llm: job.llm.as_deref(),
        evidence_root: &job.evidence_root,
        baseline_dir: job.baseline_dir.as_deref(),
    };
    let result = run_test(session.as_ref(), tc, &params).await;
    if let Err(e) = session.close().await {
        warn!("failed to close session for test {}: {e}", tc.test_id);
    }
    result
}

impl Executor {
    pub fn new(config: Arc<FrameworkConfig>, llm: Option<Arc<dyn LlmClient>>, factory: Arc<BrowserSessionFactory>) -> Self {
        Self { config, llm, factory }
    }

    /// Seeds authenticated storage state once, lazily, the first time a test
    /// in the plan requires it — routed through the smart-auth resolver
    /// cascade rather than the original's single fixed-selector form fill.
    async fn seed_auth_storage_state(&self) -> Option<StorageState> {
        let auth = self.config.auth.as_ref()?;
        let llm = self.llm.as_deref()?;
        if auth.login_url.is_empty() {
            warn!("plan contains auth-required tests but no login_url is configured; running unauthenticated");
            return None;
        }

        let session = match self.factory.acquire(None).await {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to open disposable auth session: {e}");
                return None;
            }
        };

        let credentials = Credentials { username: auth.username.clone(), password: auth.password.clone() };
        let explicit = ExplicitSelectors {
            username_selector: (!auth.username_selector.is_empty()).then(|| auth.username_selector.clone()),
            password_selector: (!auth.password_selector.is_empty()).then(|| auth.password_selector.clone()),
            submit_selector: (!auth.submit_selector.is_empty()).then(|| auth.submit_selector.clone()),
        };
        let success_indicator = (!auth.success_indicator.is_empty()).then_some(auth.success_indicator.as_str());

        let result =
            authenticate_and_capture_state(session, &auth.login_url, &credentials, Some(&explicit), llm, success_indicator).await;
        if !result.success {
            warn!("smart-auth login failed: {:?}", result.failure_reason);
        }
        result.storage_state
    }

    /// Runs every test case in `plan` through a bounded worker pool,
    /// respects `max_execution_time_seconds` as a wall-clock budget across
    /// the whole run, and re-runs failures once to label flakes before
    /// returning the aggregate `RunResult`.
    pub async fn execute(&self, plan: &TestPlan, run_id: String, run_dir: &Path, baseline_dir: Option<&Path>) -> RunResult {
        let started_at = chrono::Utc::now().to_rfc3339();
        let clock = Instant::now();
        let deadline = clock + Duration::from_secs(self.config.max_execution_time_seconds.max(1));

        let mut ordered: Vec<TestCase> = plan.test_cases.clone();
        ordered.sort_by_key(|tc| tc.priority);
        let order_index: HashMap<String, usize> = ordered.iter().enumerate().map(|(i, tc)| (tc.test_id.clone(), i)).collect();

        let auth_storage_state =
            if ordered.iter().any(|tc| tc.requires_auth) { self.seed_auth_storage_state().await } else { None };

        let evidence_root = run_dir.join("evidence");
        let baseline_dir_owned = baseline_dir.map(Path::to_path_buf);

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_contexts.max(1)));
        let (tx, mut rx) = mpsc::channel::<TestResult>(ordered.len().max(1));

        for test_case in ordered.iter().cloned() {
            let job = WorkerJob {
                test_case,
                config: self.config.clone(),
                llm: self.llm.clone(),
                factory: self.factory.clone(),
                auth_storage_state: auth_storage_state.clone(),
                evidence_root: evidence_root.clone(),
                baseline_dir: baseline_dir_owned.clone(),
                deadline,
            };
            let permit_source = semaphore.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _permit = permit_source.acquire_owned().await.expect("worker semaphore closed early");
                let result = run_worker_job(job).await;
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(ordered.len());
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results.sort_by_key(|r| order_index.get(&r.test_id).copied().unwrap_or(usize::MAX));

        let tc_by_id: HashMap<&str, &TestCase> = ordered.iter().map(|tc| (tc.test_id.as_str(), tc)).collect();
        for result in results.iter_mut() {
            if result.result != "fail" {
                continue;
            }
            let Some(tc) = tc_by_id.get(result.test_id.as_str()) else { continue };
            info!("re-running potentially flaky test {} to confirm failure", result.test_id);

            let storage = if tc.requires_auth { auth_storage_state.clone() } else { None };
            let session = match self.factory.acquire(storage).await {
                Ok(s) => s,
                Err(e) => {
                    warn!("failed to open flake-rerun session for {}: {e}", result.test_id);
                    continue;
                }
            };

            let rerun_dir = run_dir.join("flake_reruns").join(&result.test_id);
            if let Err(e) = session.start_video_recording(&rerun_dir).await {
                warn!("failed to start flake-rerun video recording for {}: {e}", result.test_id);
            }

            let params = RunTestParams {
                config: self.config.as_ref(),
                llm: self.llm.as_deref(),
                evidence_root: &evidence_root,
                baseline_dir,
            };
            let rerun_result = run_test(session.as_ref(), tc, &params).await;
            if let Err(e) = session.close().await {
                warn!("failed to close flake-rerun session for {}: {e}", result.test_id);
            }

            if rerun_result.result == "pass" {
                result.potentially_flaky = true;
                result.evidence.video_path = Some(rerun_dir.to_string_lossy().into_owned());
            }
        }

        let passed = results.iter().filter(|r| r.result == "pass").count();
        let failed = results.iter().filter(|r| r.result == "fail").count();
        let skipped = results.iter().filter(|r| r.result == "skip").count();
        let errors = results.iter().filter(|r| r.result == "error").count();

        RunResult {
            run_id,
            plan_id: plan.plan_id.clone(),
            started_at,
            completed_at: chrono::Utc::now().to_rfc3339(),
            target_url: plan.target_url.clone(),
            total_tests: results.len(),
            passed,
            failed,
            skipped,
            errors,
            duration_seconds: clock.elapsed().as_secs_f64(),
            test_results: results,
            ai_summary: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_test_case(id: &str, priority: u32) -> TestCase {
        TestCase { test_id: id.to_string(), priority, ..Default::default() }
    }

    #[test]
    fn skipped_result_carries_reason_and_identity() {
        let tc = sample_test_case("t1", 2);
        let result = skipped_result(&tc, "execution time budget exceeded");
        assert_eq!(result.test_id, "t1");
        assert_eq!(result.priority, 2);
        assert_eq!(result.result, "skip");
        assert_eq!(result.failure_reason.as_deref(), Some("execution time budget exceeded"));
    }

    #[test]
    fn errored_result_reports_session_failure() {
        let tc = sample_test_case("t2", 1);
        let result = errored_result(&tc, "failed to open session: boom");
        assert_eq!(result.result, "error");
        assert!(result.failure_reason.unwrap().contains("boom"));
    }

    #[test]
    fn priority_ordering_runs_lower_numbers_first() {
        let mut ordered = vec![sample_test_case("b", 3), sample_test_case("a", 1), sample_test_case("c", 1)];
        ordered.sort_by_key(|tc| tc.priority);
        let ids: Vec<&str> = ordered.iter().map(|tc| tc.test_id.as_str()).collect();
        // Stable sort: equal-priority tests ("a" and "c") keep their plan order.
        assert_eq!(ids, vec!["a", "c", "b"]);
    }
}
