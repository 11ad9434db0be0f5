//! Site model data types and DOM cataloguing (component F): element/form
//! extraction and page-type classification against a `PageHandle`.

mod classify;
mod extractor;
mod form_analyzer;
mod types;

pub use classify::classify_page;
pub use extractor::extract_elements;
pub use form_analyzer::analyze_forms;
pub use types::{
    ApiEndpoint, AuthFlow, AuthRequirement, ElementModel, FormField, FormModel, NetworkRequest,
    PageModel, SiteModel,
};
