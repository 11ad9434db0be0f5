//! AI-driven test plan generation. Grounded on
//! `examples/original_source/src/planner/planner.py`.

use std::sync::Arc;

use qa_config::FrameworkConfig;
use qa_coverage::{CoverageGapReport, CoverageRegistry};
use qa_llm::LlmClient;
use qa_site_model::SiteModel;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::credentials::inject_credentials;
use crate::fallback::generate_fallback_plan;
use crate::prompts::{build_planning_prompt, PLANNING_SYSTEM_PROMPT};
use crate::schema_validator::validate_test_plan;
use crate::summary::summarize_site_model;
use crate::types::{Action, Assertion, TestCase, TestPlan};

pub struct Planner {
    config: FrameworkConfig,
    llm: Arc<dyn LlmClient>,
}

impl Planner {
    pub fn new(config: FrameworkConfig, llm: Arc<dyn LlmClient>) -> Self {
        Self { config, llm }
    }

    pub async fn generate_plan(
        &self,
        site_model: &SiteModel,
        coverage_registry: Option<&CoverageRegistry>,
        gap_report: Option<&CoverageGapReport>,
    ) -> TestPlan {
        let _ = coverage_registry;
        info!("generating test plan for {}", site_model.base_url);

        debug!(
            "summarizing site model ({} pages, {} API endpoints)...",
            site_model.pages.len(),
            site_model.api_endpoints.len()
        );
        let site_summary = summarize_site_model(site_model);
        debug!("site summary: {} chars", site_summary.len());

        let gaps_summary = match gap_report {
            Some(report) => serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string()),
            None => "{}".to_string(),
        };

        let viewports_json = serde_json::to_string(&self.config.viewports).unwrap_or_default();
        let config_summary = format!(
            "Categories: {}\nMax tests: {}\nVisual diff tolerance: {}\nViewports: {}\n",
            self.config.categories.join(", "),
            self.config.max_tests_per_run,
            self.config.visual_diff_tolerance,
            viewports_json,
        );

        debug!(
            "building planning prompt (categories: {}, max_tests: {})...",
            self.config.categories.join(", "),
            self.config.max_tests_per_run
        );
        let user_message = build_planning_prompt(
            &site_summary,
            &gaps_summary,
            &config_summary,
            &self.config.hints,
            self.config.max_tests_per_run,
        );
        debug!("planning prompt built: {} chars", user_message.len());

        info!("requesting AI-generated test plan...");
        let plan_data = match self
            .llm
            .complete_json(PLANNING_SYSTEM_PROMPT, &user_message, self.config.ai_max_planning_tokens)
            .await
        {
            Ok(data) => data,
            Err(err) => {
                error!("AI planning failed: {err}. Generating fallback plan.");
                return inject_credentials(generate_fallback_plan(&self.config, site_model), self.config.auth.as_ref());
            }
        };
        let ai_test_case_count =
            plan_data.get("test_cases").and_then(Value::as_array).map(Vec::len).unwrap_or(0);
        debug!("AI returned plan data with {} test cases", ai_test_case_count);

        debug!("parsing AI plan response...");
        let mut plan = parse_plan(&plan_data, site_model);
        debug!("validating test plan...");
        let errors = validate_test_plan(&plan);
        if !errors.is_empty() {
            warn!("plan validation warnings: {errors:?}");
            plan.test_cases.retain(|tc| !errors.iter().any(|err| err.contains(&tc.test_id)));
        }

        let plan = inject_credentials(plan, self.config.auth.as_ref());
        info!("generated plan with {} test cases", plan.test_cases.len());
        plan
    }
}

fn parse_plan(data: &Value, site_model: &SiteModel) -> TestPlan {
    let plan_id = data
        .get("plan_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("plan_{}", &Uuid::new_v4().simple().to_string()[..8]));
    let generated_at = data
        .get("generated_at")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());

    let mut test_cases = Vec::new();
    if let Some(raw_cases) = data.get("test_cases").and_then(Value::as_array) {
        for tc_data in raw_cases {
            match parse_test_case(tc_data) {
                Ok(tc) => test_cases.push(tc),
                Err(err) => warn!("skipping invalid test case: {err}"),
            }
        }
    }

    let estimated_duration_seconds = data
        .get("estimated_duration_seconds")
        .and_then(Value::as_u64)
        .unwrap_or_else(|| test_cases.len() as u64 * 15);

    let coverage_intent = data
        .get("coverage_intent")
        .and_then(Value::as_object)
        .map(|m| m.clone().into_iter().collect())
        .unwrap_or_default();

    TestPlan {
        plan_id,
        generated_at,
        target_url: site_model.base_url.clone(),
        test_cases,
        estimated_duration_seconds,
        coverage_intent,
    }
}

fn parse_test_case(tc_data: &Value) -> Result<TestCase, String> {
    let preconditions = parse_actions(tc_data.get("preconditions"))?;
    let steps = parse_actions(tc_data.get("steps"))?;
    let assertions = parse_assertions(tc_data.get("assertions"))?;

    Ok(TestCase {
        test_id: tc_data
            .get("test_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("tc_{}", &Uuid::new_v4().simple().to_string()[..6])),
        name: tc_data.get("name").and_then(Value::as_str).unwrap_or("Unnamed test").to_string(),
        description: tc_data.get("description").and_then(Value::as_str).unwrap_or("").to_string(),
        category: tc_data.get("category").and_then(Value::as_str).unwrap_or("functional").to_string(),
        priority: tc_data.get("priority").and_then(Value::as_u64).unwrap_or(3) as u32,
        target_page_id: tc_data.get("target_page_id").and_then(Value::as_str).unwrap_or("").to_string(),
        coverage_signature: tc_data.get("coverage_signature").and_then(Value::as_str).unwrap_or("").to_string(),
        requires_auth: tc_data.get("requires_auth").and_then(Value::as_bool).unwrap_or(true),
        preconditions,
        steps,
        assertions,
        timeout_seconds: tc_data.get("timeout_seconds").and_then(Value::as_u64).unwrap_or(30) as u32,
    })
}

fn parse_actions(raw: Option<&Value>) -> Result<Vec<Action>, String> {
    let Some(raw) = raw.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    raw.iter()
        .map(|a| {
            serde_json::from_value(a.clone()).map_err(|err| format!("invalid action: {err}"))
        })
        .collect()
}

fn parse_assertions(raw: Option<&Value>) -> Result<Vec<Assertion>, String> {
    let Some(raw) = raw.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    raw.iter()
        .map(|a| {
            serde_json::from_value(a.clone()).map_err(|err| format!("invalid assertion: {err}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_plan_falls_back_to_generated_ids_when_missing() {
        let data = json!({
            "test_cases": [
                {"name": "Go home", "steps": [{"action_type": "navigate", "value": "https://example.com"}]}
            ]
        });
        let site_model = SiteModel {
            base_url: "https://example.com".to_string(),
            ..Default::default()
        };
        let plan = parse_plan(&data, &site_model);
        assert_eq!(plan.test_cases.len(), 1);
        assert!(plan.test_cases[0].test_id.starts_with("tc_"));
        assert!(!plan.plan_id.is_empty());
    }

    #[test]
    fn parse_plan_skips_malformed_test_case_but_keeps_others() {
        let data = json!({
            "test_cases": [
                {"name": "broken", "steps": [{"action_type": 5}]},
                {"name": "ok", "test_id": "tc_ok", "steps": [{"action_type": "navigate"}]}
            ]
        });
        let site_model = SiteModel::default();
        let plan = parse_plan(&data, &site_model);
        assert_eq!(plan.test_cases.len(), 1);
        assert_eq!(plan.test_cases[0].test_id, "tc_ok");
    }
}
