//! Human-readable coverage summary. Grounded on
//! `examples/original_source/src/coverage/scorer.py`.

use crate::types::CoverageRegistry;

pub fn calculate_coverage_summary(registry: &CoverageRegistry) -> String {
    let stats = &registry.global_stats;
    let mut lines = vec![
        format!("Coverage Summary for {}", registry.target_url),
        format!("  Pages: {}/{} tested", stats.pages_tested, stats.total_pages),
        format!("  Overall score: {:.0}%", stats.overall_score * 100.0),
    ];

    let mut categories: Vec<_> = stats.category_scores.iter().collect();
    categories.sort_by(|a, b| a.0.cmp(b.0));
    for (cat, score) in categories {
        let mut capitalized = cat.clone();
        if let Some(first) = capitalized.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        lines.push(format!("  {capitalized}: {:.0}%", score * 100.0));
    }

    if stats.regression_count > 0 {
        lines.push(format!("  Regressions: {}", stats.regression_count));
    }
    if !stats.last_full_run.is_empty() {
        lines.push(format!("  Last run: {}", stats.last_full_run));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GlobalCoverageStats;
    use std::collections::HashMap;

    #[test]
    fn formats_summary_with_categories_and_regressions() {
        let mut registry = CoverageRegistry::new("https://example.com");
        registry.global_stats = GlobalCoverageStats {
            total_pages: 10,
            pages_tested: 8,
            overall_score: 0.75,
            category_scores: HashMap::from([("functional".to_string(), 0.8), ("visual".to_string(), 0.7)]),
            last_full_run: "2026-07-01T00:00:00Z".to_string(),
            regression_count: 2,
        };
        let summary = calculate_coverage_summary(&registry);
        assert!(summary.contains("Pages: 8/10 tested"));
        assert!(summary.contains("Overall score: 75%"));
        assert!(summary.contains("Functional: 80%"));
        assert!(summary.contains("Visual: 70%"));
        assert!(summary.contains("Regressions: 2"));
    }
}
