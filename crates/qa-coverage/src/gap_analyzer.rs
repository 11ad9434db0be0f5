//! Coverage gap analysis — identifies untested and under-tested areas.
//! Grounded on `examples/original_source/src/coverage/gap_analyzer.py`.

use chrono::{DateTime, Duration, Utc};
use qa_site_model::SiteModel;
use tracing::info;

use crate::types::{CoverageGapReport, CoverageRegistry};

const LOW_COVERAGE_THRESHOLD: f64 = 0.5;

/// Cross-references the site model against the registry to find pages
/// never tested, pages not re-tested within `staleness_days`, categories
/// scoring below the low-coverage threshold, and signatures currently
/// failing, then rolls that up into a short suggested-focus list.
pub fn analyze_gaps(
    registry: &CoverageRegistry,
    site_model: &SiteModel,
    staleness_days: u32,
) -> CoverageGapReport {
    let now = Utc::now();
    let staleness_cutoff = now - Duration::days(staleness_days as i64);

    let mut untested_pages = Vec::new();
    let mut stale_pages = Vec::new();
    let mut low_coverage_areas = Vec::new();
    let mut recent_failures = Vec::new();

    for page in &site_model.pages {
        let pid = &page.page_id;

        let page_cov = match registry.pages.get(pid) {
            Some(cov) => cov,
            None => {
                untested_pages.push(pid.clone());
                continue;
            }
        };

        if page_cov.last_tested.is_empty() {
            stale_pages.push(pid.clone());
        } else {
            match DateTime::parse_from_rfc3339(&page_cov.last_tested.replace('Z', "+00:00")) {
                Ok(last) if last.with_timezone(&Utc) < staleness_cutoff => stale_pages.push(pid.clone()),
                Ok(_) => {}
                Err(_) => stale_pages.push(pid.clone()),
            }
        }

        for (cat_name, cat_cov) in &page_cov.categories {
            if cat_cov.coverage_score < LOW_COVERAGE_THRESHOLD {
                low_coverage_areas.push((pid.clone(), cat_name.clone(), cat_cov.coverage_score));
            }
        }

        for cat_cov in page_cov.categories.values() {
            for sig in &cat_cov.signatures_tested {
                if sig.last_result == "fail" {
                    recent_failures.push((pid.clone(), sig.signature.clone()));
                }
            }
        }
    }

    let mut suggested_focus = Vec::new();
    if !untested_pages.is_empty() {
        suggested_focus.push(format!("Test {} untested pages", untested_pages.len()));
    }
    if !recent_failures.is_empty() {
        suggested_focus.push(format!("Re-test {} recent failures", recent_failures.len()));
    }
    if !stale_pages.is_empty() {
        suggested_focus.push(format!("Refresh {} stale pages", stale_pages.len()));
    }
    if !low_coverage_areas.is_empty() {
        suggested_focus.push(format!("Improve {} low-coverage areas", low_coverage_areas.len()));
    }

    info!(
        "gap analysis: {} untested, {} stale, {} low-coverage, {} failures",
        untested_pages.len(),
        stale_pages.len(),
        low_coverage_areas.len(),
        recent_failures.len(),
    );

    CoverageGapReport {
        untested_pages,
        stale_pages,
        low_coverage_areas,
        recent_failures,
        suggested_focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryCoverage, PageCoverage};
    use qa_site_model::PageModel;

    fn page_model(id: &str) -> PageModel {
        PageModel {
            page_id: id.to_string(),
            url: format!("https://example.com/{id}"),
            ..Default::default()
        }
    }

    #[test]
    fn flags_page_absent_from_registry_as_untested() {
        let registry = CoverageRegistry::new("https://example.com");
        let model = SiteModel {
            base_url: "https://example.com".to_string(),
            pages: vec![page_model("p1")],
            ..Default::default()
        };
        let report = analyze_gaps(&registry, &model, 7);
        assert_eq!(report.untested_pages, vec!["p1".to_string()]);
    }

    #[test]
    fn flags_low_coverage_category() {
        let mut registry = CoverageRegistry::new("https://example.com");
        let mut page_cov = PageCoverage::new("p1", "https://example.com/p1", "static");
        page_cov.last_tested = Utc::now().to_rfc3339();
        let mut cat = CategoryCoverage::new("functional");
        cat.coverage_score = 0.2;
        page_cov.categories.insert("functional".to_string(), cat);
        registry.pages.insert("p1".to_string(), page_cov);

        let model = SiteModel {
            base_url: "https://example.com".to_string(),
            pages: vec![page_model("p1")],
            ..Default::default()
        };
        let report = analyze_gaps(&registry, &model, 7);
        assert_eq!(report.low_coverage_areas.len(), 1);
        assert!(report.untested_pages.is_empty());
    }
}
