//! Coverage registry data structures. Grounded on
//! `examples/original_source/src/models/coverage.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResultSummary {
    pub run_id: String,
    pub timestamp: String,
    pub result: String,
    pub duration_seconds: f64,
    pub failure_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureRecord {
    pub signature: String,
    pub last_tested: String,
    pub last_result: String,
    pub test_count: u32,
    pub history: Vec<TestResultSummary>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementCoverage {
    pub element_id: String,
    pub tested: bool,
    pub last_tested: Option<String>,
    pub test_count: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryCoverage {
    pub category: String,
    pub signatures_tested: Vec<SignatureRecord>,
    pub coverage_score: f64,
    pub last_tested: String,
}

impl CategoryCoverage {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCoverage {
    pub page_id: String,
    pub url: String,
    pub page_type: String,
    pub categories: HashMap<String, CategoryCoverage>,
    pub elements_tested: HashMap<String, ElementCoverage>,
    pub last_tested: String,
    pub test_count: u32,
}

impl PageCoverage {
    pub fn new(page_id: impl Into<String>, url: impl Into<String>, page_type: impl Into<String>) -> Self {
        Self {
            page_id: page_id.into(),
            url: url.into(),
            page_type: page_type.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalCoverageStats {
    pub total_pages: usize,
    pub pages_tested: usize,
    pub overall_score: f64,
    pub category_scores: HashMap<String, f64>,
    pub last_full_run: String,
    pub regression_count: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageGapReport {
    pub untested_pages: Vec<String>,
    pub stale_pages: Vec<String>,
    pub low_coverage_areas: Vec<(String, String, f64)>,
    pub recent_failures: Vec<(String, String)>,
    pub suggested_focus: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageRegistry {
    pub target_url: String,
    pub last_updated: String,
    pub pages: HashMap<String, PageCoverage>,
    /// Multi-page user journeys; not yet structured, reserved for a future
    /// journey-coverage model.
    pub journeys: HashMap<String, serde_json::Value>,
    pub global_stats: GlobalCoverageStats,
}

impl CoverageRegistry {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }
}
