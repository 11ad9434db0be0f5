//! Test plan execution: worker pool, AI fallback, evidence collection, and
//! flake detection (component K). Grounded on
//! `examples/original_source/src/executor/executor.py` and its
//! `evidence_collector.py`/`fallback.py` companions.

mod evidence;
mod executor;
mod fallback;
mod test_runner;

pub use evidence::{format_console_logs, EvidenceCollector};
pub use executor::Executor;
pub use fallback::{FallbackHandler, FallbackResponse};
pub use test_runner::{run_test, RunTestParams};
