//! Coverage registry persistence and run-result ingestion. Grounded on
//! `examples/original_source/src/coverage/registry.py`.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use qa_core_types::RunResult;
use qa_site_model::SiteModel;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{
    CategoryCoverage, CoverageRegistry, GlobalCoverageStats, PageCoverage, SignatureRecord,
    TestResultSummary,
};

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to read coverage registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write coverage registry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub struct CoverageRegistryManager {
    path: PathBuf,
    target_url: String,
    history_retention: usize,
}

impl CoverageRegistryManager {
    pub fn new(path: impl Into<PathBuf>, target_url: impl Into<String>, history_retention: usize) -> Self {
        Self {
            path: path.into(),
            target_url: target_url.into(),
            history_retention,
        }
    }

    /// Loads the registry from disk, or starts a fresh one. A corrupt or
    /// unreadable file is logged and treated as absent rather than failing
    /// the run outright.
    pub fn load(&self) -> CoverageRegistry {
        if self.path.exists() {
            match std::fs::read_to_string(&self.path) {
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(registry) => return registry,
                    Err(err) => warn!("failed to parse coverage registry, creating new: {err}"),
                },
                Err(err) => warn!("failed to read coverage registry, creating new: {err}"),
            }
        }
        CoverageRegistry::new(self.target_url.clone())
    }

    pub fn save(&self, registry: &mut CoverageRegistry) -> Result<(), CoverageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoverageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        registry.last_updated = now_iso();
        let text = serde_json::to_string_pretty(registry).map_err(|err| CoverageError::Write {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
        })?;
        std::fs::write(&self.path, text).map_err(|source| CoverageError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved coverage registry to {}", self.path.display());
        Ok(())
    }

    /// Folds a completed run into the registry: each test result updates the
    /// page/category/signature it exercised, then global stats are
    /// recalculated from the whole registry.
    pub fn update_from_run(
        &self,
        mut registry: CoverageRegistry,
        run_result: &RunResult,
        site_model: Option<&SiteModel>,
    ) -> CoverageRegistry {
        let now = now_iso();

        let mut page_lookup: HashMap<String, (String, String)> = HashMap::new();
        if let Some(model) = site_model {
            for page in &model.pages {
                page_lookup.insert(page.page_id.clone(), (page.url.clone(), page.page_type.clone()));
            }
        }

        for test_result in &run_result.test_results {
            // Prefer actual_page_id (where the browser ended up) over
            // target_page_id (where the plan said to start) so coverage is
            // attributed correctly when a test navigates across pages, e.g.
            // login -> dashboard.
            let page_id = test_result.effective_page_id().to_string();
            let category = test_result.category.clone();

            let page_cov = registry.pages.entry(page_id.clone()).or_insert_with(|| {
                let (mut url, page_type) = page_lookup
                    .get(&page_id)
                    .cloned()
                    .unwrap_or_else(|| (String::new(), String::new()));
                if url.is_empty() && !test_result.actual_url.is_empty() {
                    url = test_result.actual_url.clone();
                }
                PageCoverage::new(page_id.clone(), url, page_type)
            });
            page_cov.last_tested = now.clone();
            page_cov.test_count += 1;

            let cat_cov = page_cov
                .categories
                .entry(category.clone())
                .or_insert_with(|| CategoryCoverage::new(category.clone()));
            cat_cov.last_tested = now.clone();

            let signature = if !test_result.coverage_signature.is_empty() {
                test_result.coverage_signature.clone()
            } else {
                test_result.test_name.clone()
            };

            let summary = TestResultSummary {
                run_id: run_result.run_id.clone(),
                timestamp: now.clone(),
                result: test_result.result.clone(),
                duration_seconds: test_result.duration_seconds,
                failure_reason: test_result.failure_reason.clone(),
            };

            match cat_cov.signatures_tested.iter_mut().find(|sr| sr.signature == signature) {
                Some(existing) => {
                    existing.last_tested = now.clone();
                    existing.last_result = test_result.result.clone();
                    existing.test_count += 1;
                    existing.history.push(summary);
                    if existing.history.len() > self.history_retention {
                        let overflow = existing.history.len() - self.history_retention;
                        existing.history.drain(0..overflow);
                    }
                }
                None => cat_cov.signatures_tested.push(SignatureRecord {
                    signature,
                    last_tested: now.clone(),
                    last_result: test_result.result.clone(),
                    test_count: 1,
                    history: vec![summary],
                }),
            }
        }

        self.recalculate_stats(&mut registry);
        registry
    }

    fn recalculate_stats(&self, registry: &mut CoverageRegistry) {
        let total_pages = registry.pages.len();
        let pages_tested = registry.pages.values().filter(|p| p.test_count > 0).count();

        let mut category_scores: HashMap<String, f64> = HashMap::new();
        for page_cov in registry.pages.values_mut() {
            for cat_cov in page_cov.categories.values_mut() {
                let total = cat_cov.signatures_tested.len();
                let passed = cat_cov
                    .signatures_tested
                    .iter()
                    .filter(|s| s.last_result == "pass")
                    .count();
                cat_cov.coverage_score = if total > 0 { passed as f64 / total as f64 } else { 0.0 };
                *category_scores.entry(cat_cov.category.clone()).or_insert(0.0) += cat_cov.coverage_score;
            }
        }

        for (cat_name, score) in category_scores.iter_mut() {
            let pages_with_cat = registry
                .pages
                .values()
                .filter(|p| p.categories.contains_key(cat_name))
                .count();
            if pages_with_cat > 0 {
                *score /= pages_with_cat as f64;
            }
        }

        let overall = if category_scores.is_empty() {
            0.0
        } else {
            category_scores.values().sum::<f64>() / category_scores.len() as f64
        };

        let mut regression_count = 0u32;
        for page_cov in registry.pages.values() {
            for cat_cov in page_cov.categories.values() {
                for sig in &cat_cov.signatures_tested {
                    if sig.history.len() >= 2 {
                        let prev = &sig.history[sig.history.len() - 2].result;
                        let curr = &sig.history[sig.history.len() - 1].result;
                        if prev == "pass" && curr == "fail" {
                            regression_count += 1;
                        }
                    }
                }
            }
        }

        registry.global_stats = GlobalCoverageStats {
            total_pages,
            pages_tested,
            overall_score: (overall * 1000.0).round() / 1000.0,
            category_scores: category_scores
                .into_iter()
                .map(|(k, v)| (k, (v * 1000.0).round() / 1000.0))
                .collect(),
            last_full_run: now_iso(),
            regression_count,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qa_core_types::TestResult;

    fn test_result(result: &str, page_id: &str) -> TestResult {
        TestResult {
            test_id: "t1".to_string(),
            test_name: "checkout flow".to_string(),
            category: "functional".to_string(),
            target_page_id: page_id.to_string(),
            result: result.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn update_from_run_creates_page_and_category_entries() {
        let manager = CoverageRegistryManager::new(PathBuf::from("/tmp/unused.json"), "https://example.com", 20);
        let registry = CoverageRegistry::new("https://example.com");
        let run = RunResult {
            run_id: "run-1".to_string(),
            test_results: vec![test_result("pass", "page-1")],
            ..Default::default()
        };
        let registry = manager.update_from_run(registry, &run, None);
        let page = registry.pages.get("page-1").expect("page recorded");
        assert_eq!(page.test_count, 1);
        let cat = page.categories.get("functional").expect("category recorded");
        assert_eq!(cat.signatures_tested.len(), 1);
        assert_eq!(registry.global_stats.total_pages, 1);
        assert_eq!(registry.global_stats.pages_tested, 1);
    }

    #[test]
    fn detects_pass_to_fail_regression() {
        let manager = CoverageRegistryManager::new(PathBuf::from("/tmp/unused.json"), "https://example.com", 20);
        let mut registry = CoverageRegistry::new("https://example.com");
        registry = manager.update_from_run(
            registry,
            &RunResult {
                run_id: "run-1".to_string(),
                test_results: vec![test_result("pass", "page-1")],
                ..Default::default()
            },
            None,
        );
        registry = manager.update_from_run(
            registry,
            &RunResult {
                run_id: "run-2".to_string(),
                test_results: vec![test_result("fail", "page-1")],
                ..Default::default()
            },
            None,
        );
        assert_eq!(registry.global_stats.regression_count, 1);
    }

    #[test]
    fn attributes_to_actual_page_id_over_target() {
        let manager = CoverageRegistryManager::new(PathBuf::from("/tmp/unused.json"), "https://example.com", 20);
        let mut tr = test_result("pass", "login-page");
        tr.actual_page_id = "dashboard-page".to_string();
        let registry = CoverageRegistry::new("https://example.com");
        let run = RunResult {
            test_results: vec![tr],
            ..Default::default()
        };
        let registry = manager.update_from_run(registry, &run, None);
        assert!(registry.pages.contains_key("dashboard-page"));
        assert!(!registry.pages.contains_key("login-page"));
    }
}
