//! Persistent coverage registry, regression attribution, and visual
//! baselines (component G). Grounded on
//! `examples/original_source/src/coverage/`.

mod gap_analyzer;
mod registry;
mod scorer;
mod types;
mod visual_baseline;

pub use gap_analyzer::analyze_gaps;
pub use registry::{CoverageError, CoverageRegistryManager};
pub use scorer::calculate_coverage_summary;
pub use types::{
    CategoryCoverage, CoverageGapReport, CoverageRegistry, ElementCoverage, GlobalCoverageStats,
    PageCoverage, SignatureRecord, TestResultSummary,
};
pub use visual_baseline::{BaselineEntry, VisualBaselineRegistry, VisualBaselineRegistryManager};
