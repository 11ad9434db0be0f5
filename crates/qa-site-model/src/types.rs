//! Data model produced by the crawler: element/form catalogues, page and
//! site models (component F). Grounded on
//! `examples/original_source/src/models/site_model.py`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElementModel {
    pub element_id: String,
    pub tag: String,
    pub selector: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub is_interactive: bool,
    /// button, link, input, dropdown, textarea, tab, menuitem, ...
    #[serde(default)]
    pub element_type: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    /// text, email, password, select, checkbox, ...
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validation_pattern: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub selector: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormModel {
    pub form_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub submit_selector: String,
}

fn default_method() -> String {
    "GET".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub request_content_type: Option<String>,
    #[serde(default)]
    pub response_content_type: Option<String>,
    #[serde(default)]
    pub status_codes_seen: Vec<u16>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthFlow {
    pub login_url: String,
    /// form, oauth, ...
    #[serde(default = "default_login_method")]
    pub login_method: String,
    #[serde(default = "default_true")]
    pub requires_credentials: bool,
    /// How the login form was located: "explicit", "heuristic", "llm_vision",
    /// or "partial_fallback". `None` until a smart-auth resolution has run.
    #[serde(default)]
    pub detection_method: Option<String>,
    /// The resolved username/password/submit selectors, keyed by role, for
    /// reuse on subsequent runs without re-resolving.
    #[serde(default)]
    pub detected_selectors: HashMap<String, String>,
}

fn default_login_method() -> String {
    "form".to_string()
}

fn default_true() -> bool {
    true
}

/// Whether a page required an authenticated session to reach — populated by
/// the crawler's auth probe pass, not derivable from DOM content alone.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AuthRequirement {
    Required,
    NotRequired,
    Unknown,
}

impl Default for AuthRequirement {
    fn default() -> Self {
        AuthRequirement::Unknown
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageModel {
    pub page_id: String,
    pub url: String,
    /// listing, detail, form, dashboard, static, error
    #[serde(default = "default_page_type")]
    pub page_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub elements: Vec<ElementModel>,
    #[serde(default)]
    pub forms: Vec<FormModel>,
    #[serde(default)]
    pub network_requests: Vec<NetworkRequest>,
    #[serde(default)]
    pub screenshot_path: String,
    #[serde(default)]
    pub dom_snapshot_path: String,
    #[serde(default)]
    pub auth_required: AuthRequirement,
}

fn default_page_type() -> String {
    "static".to_string()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteModel {
    pub base_url: String,
    #[serde(default)]
    pub pages: Vec<PageModel>,
    #[serde(default)]
    pub navigation_graph: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub api_endpoints: Vec<ApiEndpoint>,
    #[serde(default)]
    pub auth_flow: Option<AuthFlow>,
    #[serde(default)]
    pub crawl_metadata: HashMap<String, serde_json::Value>,
}
