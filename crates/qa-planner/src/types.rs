//! Test plan data structures produced by the planner. Grounded on
//! `examples/original_source/src/models/test_plan.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// navigate, click, fill, select, hover, scroll, wait, screenshot, keyboard
    pub action_type: String,
    pub selector: Option<String>,
    pub value: Option<String>,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Assertion {
    pub assertion_type: String,
    pub selector: Option<String>,
    pub expected_value: Option<String>,
    pub tolerance: Option<f64>,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    pub test_id: String,
    pub name: String,
    pub description: String,
    /// functional, visual, security
    pub category: String,
    /// 1 (critical) to 5 (low)
    pub priority: u32,
    pub target_page_id: String,
    pub coverage_signature: String,
    pub requires_auth: bool,
    pub preconditions: Vec<Action>,
    pub steps: Vec<Action>,
    pub assertions: Vec<Assertion>,
    pub timeout_seconds: u32,
}

impl Default for TestCase {
    fn default() -> Self {
        Self {
            test_id: String::new(),
            name: String::new(),
            description: String::new(),
            category: "functional".to_string(),
            priority: 3,
            target_page_id: String::new(),
            coverage_signature: String::new(),
            requires_auth: true,
            preconditions: Vec::new(),
            steps: Vec::new(),
            assertions: Vec::new(),
            timeout_seconds: 30,
        }
    }
}

impl TestCase {
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.preconditions.iter().chain(self.steps.iter())
    }

    pub fn all_actions_mut(&mut self) -> impl Iterator<Item = &mut Action> {
        self.preconditions.iter_mut().chain(self.steps.iter_mut())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestPlan {
    pub plan_id: String,
    pub generated_at: String,
    pub target_url: String,
    pub test_cases: Vec<TestCase>,
    pub estimated_duration_seconds: u64,
    pub coverage_intent: HashMap<String, serde_json::Value>,
}
