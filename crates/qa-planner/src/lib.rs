//! AI-driven test plan generation with deterministic fallback (component
//! H). Grounded on `examples/original_source/src/planner/`.

mod credentials;
mod fallback;
mod planner;
mod prompts;
mod schema_validator;
mod summary;
mod types;

pub use credentials::{inject_credentials, AUTH_PLACEHOLDER_LOGIN_URL, AUTH_PLACEHOLDER_PASSWORD, AUTH_PLACEHOLDER_USERNAME};
pub use fallback::generate_fallback_plan;
pub use planner::Planner;
pub use prompts::{build_planning_prompt, PLANNING_SYSTEM_PROMPT};
pub use schema_validator::validate_test_plan;
pub use summary::summarize_site_model;
pub use types::{Action, Assertion, TestCase, TestPlan};
