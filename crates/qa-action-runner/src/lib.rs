//! Action dispatch, `{{$variable}}` resolution, and the selector-resolution
//! cascade (component I). Grounded on
//! `examples/original_source/src/executor/action_runner.py` and
//! `selector_resolver.py`.

mod dynamic_vars;
mod errors;
mod runner;
mod selector_resolver;

pub use dynamic_vars::resolve_dynamic_vars_for_test_case;
pub use errors::ActionRunnerError;
pub use runner::run_action;
pub use selector_resolver::{resolve_selector, SelectorAttempt, SelectorResolutionResult};
