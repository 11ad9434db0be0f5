use anyhow::Result;
use qa_config::FrameworkConfig;
use tracing::info;

use crate::orchestrator::Orchestrator;

use super::args::{Commands, CoverageAction};

pub async fn dispatch(command: &Commands, config: FrameworkConfig) -> Result<()> {
    let orchestrator = Orchestrator::new(config)?;

    match command {
        Commands::Crawl => {
            let model = orchestrator.run_crawl_only().await?;
            info!("crawl complete: {} pages discovered", model.pages.len());
        }
        Commands::Plan => {
            let plan = orchestrator.run_plan_only().await?;
            info!("plan complete: {} test cases generated", plan.test_cases.len());
        }
        Commands::Execute { plan } => {
            let plan_path = plan.clone().unwrap_or_else(|| ".qa-framework/latest_plan.json".into());
            let text = std::fs::read_to_string(&plan_path)
                .map_err(|e| anyhow::anyhow!("failed to read plan at {}: {e}", plan_path.display()))?;
            let test_plan = serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse plan at {}: {e}", plan_path.display()))?;
            let run_result = orchestrator.run_execute_only(&test_plan).await?;
            info!(
                "execution complete: {}/{} passed, {} failed, {} errors, {} skipped",
                run_result.passed, run_result.total_tests, run_result.failed, run_result.errors, run_result.skipped
            );
        }
        Commands::Run => {
            let summary = orchestrator.run_full_pipeline().await?;
            info!(
                "pipeline complete in {:.1}s: {}/{} passed ({} failed, {} errors, {} skipped), coverage {:.0}%, {} regressions",
                summary.duration_seconds,
                summary.passed,
                summary.total_tests,
                summary.failed,
                summary.errors,
                summary.skipped,
                summary.coverage_overall_score * 100.0,
                summary.regression_count,
            );
        }
        Commands::Coverage { action } => match action {
            CoverageAction::Show => println!("{}", orchestrator.get_coverage_summary()),
            CoverageAction::Gaps => {
                let gaps = orchestrator.get_coverage_gaps()?;
                println!("{}", serde_json::to_string_pretty(&gaps)?);
            }
            CoverageAction::Reset => {
                orchestrator.reset_coverage()?;
                info!("coverage registry reset");
            }
        },
    }

    Ok(())
}
