//! Coordinates the full crawl -> plan -> execute -> coverage pipeline, and
//! exposes each stage as a separately invokable operation. Grounded on
//! `examples/original_source/src/orchestrator.py`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use qa_browser_session::BrowserSessionFactory;
use qa_config::{FrameworkConfig, ReportFormat};
use qa_core_types::RunResult;
use qa_coverage::{analyze_gaps, calculate_coverage_summary, CoverageGapReport, CoverageRegistryManager};
use qa_crawler::Crawler;
use qa_executor::Executor;
use qa_llm::LlmClient;
use qa_planner::{Planner, TestPlan};
use qa_regression::detect_regressions;
use qa_site_model::SiteModel;
use tracing::{info, warn};
use uuid::Uuid;

const FRAMEWORK_DIR: &str = ".qa-framework";
const RUNS_DIR: &str = "runs";

pub struct PipelineSummary {
    pub run_id: String,
    pub duration_seconds: f64,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub coverage_overall_score: f64,
    pub regression_count: usize,
}

pub struct Orchestrator {
    config: FrameworkConfig,
    framework_dir: PathBuf,
    runs_dir: PathBuf,
    registry_manager: CoverageRegistryManager,
    llm: Option<Arc<dyn LlmClient>>,
    factory: Arc<BrowserSessionFactory>,
}

impl Orchestrator {
    /// Tries to bring up the Anthropic-backed client; an absent API key
    /// degrades every AI-assisted tier to its deterministic fallback rather
    /// than failing the run, mirroring the original's `try/except
    /// EnvironmentError` around `AIClient(...)`.
    fn init_llm() -> Option<Arc<dyn LlmClient>> {
        match qa_llm::AnthropicClient::from_env() {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("AI client unavailable ({e}); running in deterministic-fallback mode");
                None
            }
        }
    }

    pub fn new(config: FrameworkConfig) -> Result<Self> {
        let framework_dir = PathBuf::from(FRAMEWORK_DIR);
        let runs_dir = PathBuf::from(RUNS_DIR);
        std::fs::create_dir_all(&framework_dir).context("failed to create .qa-framework directory")?;
        std::fs::create_dir_all(&runs_dir).context("failed to create runs directory")?;

        let registry_manager = CoverageRegistryManager::new(
            framework_dir.join("coverage").join("registry.json"),
            config.target_url.clone(),
            config.history_retention_runs,
        );
        let factory = Arc::new(BrowserSessionFactory::new(config.browser.headless, qa_browser_session::Viewport {
            width: config.browser.viewport.width,
            height: config.browser.viewport.height,
        }));

        Ok(Self { config, framework_dir, runs_dir, registry_manager, llm: Self::init_llm(), factory })
    }

    fn site_model_path(&self) -> PathBuf {
        self.framework_dir.join("site_model").join("model.json")
    }

    fn baselines_dir(&self) -> PathBuf {
        self.framework_dir.join("site_model").join("baselines")
    }

    fn plan_path(&self) -> PathBuf {
        self.framework_dir.join("latest_plan.json")
    }

    /// Runs the entire pipeline: crawl, plan, execute, fold into coverage.
    pub async fn run_full_pipeline(&self) -> Result<PipelineSummary> {
        let start = std::time::Instant::now();
        info!("=== starting full QA pipeline for {} ===", self.config.target_url);

        info!("--- stage 1: crawl ---");
        let site_model = self.crawl().await;
        self.save_site_model(&site_model)?;

        info!("--- stage 2: plan ---");
        let plan = self.plan(&site_model).await?;
        self.save_plan(&plan)?;

        info!("--- stage 3: execute ---");
        let run_result = self.execute(&plan, Some(&site_model)).await?;
        let regression_count = self.finish_run(&run_result)?;

        info!("--- stage 4: update coverage ---");
        let mut registry = self.registry_manager.load();
        registry = self.registry_manager.update_from_run(registry, &run_result, Some(&site_model));
        self.registry_manager.save(&mut registry)?;

        let duration = start.elapsed().as_secs_f64();
        info!("=== pipeline complete in {duration:.1}s ===");

        Ok(PipelineSummary {
            run_id: run_result.run_id,
            duration_seconds: duration,
            total_tests: run_result.total_tests,
            passed: run_result.passed,
            failed: run_result.failed,
            skipped: run_result.skipped,
            errors: run_result.errors,
            coverage_overall_score: registry.global_stats.overall_score,
            regression_count,
        })
    }

    /// Persists the run result alongside its evidence directory, then
    /// compares it against the most recently completed prior run (if any)
    /// and logs any pass -> fail/error transitions. The original delegates
    /// this comparison to its reporter; since rendering is out of scope here
    /// the comparison happens directly against the on-disk run history.
    fn finish_run(&self, run_result: &RunResult) -> Result<usize> {
        let previous = self.load_previous_run_result(&run_result.run_id)?;
        let regressions = previous.as_ref().map(|prev| detect_regressions(prev, run_result)).unwrap_or_default();
        for regression in &regressions {
            warn!(
                "regression: '{}' went from {} to {}",
                regression.test_name, regression.previous_result, regression.current_result
            );
        }

        let run_dir = self.runs_dir.join(&run_result.run_id);
        std::fs::create_dir_all(&run_dir)?;
        let text = serde_json::to_string_pretty(run_result)?;
        std::fs::write(run_dir.join("result.json"), text)?;

        if self.config.report_formats.contains(&ReportFormat::Json) {
            self.write_json_report(run_result, &self.config.report_output_dir)?;
        }

        Ok(regressions.len())
    }

    /// Finds the most recently modified `result.json` under `runs/`,
    /// excluding `current_run_id`, and loads it if present.
    fn load_previous_run_result(&self, current_run_id: &str) -> Result<Option<RunResult>> {
        let Ok(entries) = std::fs::read_dir(&self.runs_dir) else { return Ok(None) };

        let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            if name == current_run_id {
                continue;
            }
            let result_path = path.join("result.json");
            if !result_path.exists() {
                continue;
            }
            let modified = std::fs::metadata(&result_path).and_then(|m| m.modified()).unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            candidates.push((modified, result_path));
        }
        candidates.sort_by_key(|(modified, _)| *modified);

        let Some((_, latest)) = candidates.pop() else { return Ok(None) };
        let text = std::fs::read_to_string(&latest)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    async fn crawl(&self) -> SiteModel {
        let crawler = Crawler::new(&self.config, &self.factory, self.llm.as_deref().unwrap_or(&qa_llm::NullLlmClient));
        crawler.crawl().await
    }

    pub async fn run_crawl_only(&self) -> Result<SiteModel> {
        let model = self.crawl().await;
        self.save_site_model(&model)?;
        Ok(model)
    }

    async fn plan(&self, site_model: &SiteModel) -> Result<TestPlan> {
        let registry = self.registry_manager.load();
        let gap_report = analyze_gaps(&registry, site_model, self.config.staleness_threshold_days);

        let planner = Planner::new(
            self.config.clone(),
            self.llm.clone().unwrap_or_else(|| Arc::new(qa_llm::NullLlmClient)),
        );
        Ok(planner.generate_plan(site_model, Some(&registry), Some(&gap_report)).await)
    }

    pub async fn run_plan_only(&self) -> Result<TestPlan> {
        let site_model = self.load_site_model()?;
        let plan = self.plan(&site_model).await?;
        self.save_plan(&plan)?;
        Ok(plan)
    }

    async fn execute(&self, plan: &TestPlan, site_model: Option<&SiteModel>) -> Result<RunResult> {
        let _ = site_model;
        let run_id = Uuid::new_v4().to_string();
        let run_dir = self.runs_dir.join(&run_id);
        std::fs::create_dir_all(&run_dir).context("failed to create run directory")?;

        let baseline_dir = self.baselines_dir();
        let baseline_dir = baseline_dir.exists().then_some(baseline_dir);

        let executor = Executor::new(Arc::new(self.config.clone()), self.llm.clone(), self.factory.clone());
        Ok(executor.execute(plan, run_id, &run_dir, baseline_dir.as_deref()).await)
    }

    pub async fn run_execute_only(&self, plan: &TestPlan) -> Result<RunResult> {
        let run_result = self.execute(plan, None).await?;
        self.finish_run(&run_result)?;
        let mut registry = self.registry_manager.load();
        let site_model = self.load_site_model().ok();
        registry = self.registry_manager.update_from_run(registry, &run_result, site_model.as_ref());
        self.registry_manager.save(&mut registry)?;
        Ok(run_result)
    }

    fn save_site_model(&self, model: &SiteModel) -> Result<()> {
        let path = self.site_model_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(model)?;
        std::fs::write(&path, text).with_context(|| format!("failed to write site model to {}", path.display()))
    }

    fn load_site_model(&self) -> Result<SiteModel> {
        let path = self.site_model_path();
        if !path.exists() {
            anyhow::bail!("no site model found at {}; run the crawl stage first", path.display());
        }
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text).with_context(|| format!("failed to parse site model at {}", path.display()))
    }

    fn save_plan(&self, plan: &TestPlan) -> Result<()> {
        let path = self.plan_path();
        let text = serde_json::to_string_pretty(plan)?;
        std::fs::write(&path, text).with_context(|| format!("failed to write plan to {}", path.display()))
    }

    pub fn get_coverage_summary(&self) -> String {
        let registry = self.registry_manager.load();
        calculate_coverage_summary(&registry)
    }

    pub fn get_coverage_gaps(&self) -> Result<CoverageGapReport> {
        let registry = self.registry_manager.load();
        let site_model = self.load_site_model()?;
        Ok(analyze_gaps(&registry, &site_model, self.config.staleness_threshold_days))
    }

    pub fn reset_coverage(&self) -> Result<()> {
        let path = self.framework_dir.join("coverage").join("registry.json");
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        info!("coverage registry reset");
        Ok(())
    }

    /// Writes the run result and (when configured) the coverage registry as
    /// JSON reports under `report_output_dir`. HTML rendering is out of
    /// scope; `RunResult`/`CoverageRegistry`'s own `Serialize` impls are the
    /// entire "JSON report format".
    pub fn write_json_report(&self, run_result: &RunResult, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{}.json", run_result.run_id));
        let text = serde_json::to_string_pretty(run_result)?;
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

pub fn now_run_label() -> String {
    Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}
