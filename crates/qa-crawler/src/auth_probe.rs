//! Post-crawl auth-requirement probe: revisits every discovered page in a
//! fresh, unauthenticated session to classify which ones actually require a
//! session. Grounded on
//! `examples/original_source/src/crawler/crawler.py::_probe_auth_requirements`.
//!
//! The `PageHandle` trait boundary (component B) doesn't surface the raw HTTP
//! status of a navigation, only success/failure, so the 401/403 branch of the
//! original is folded into "navigation failed -> unknown" here; the
//! redirected-to-login-path and login-keyword-in-title checks are unchanged.

use std::time::Duration;

use qa_browser_session::{BrowserSession, WaitUntil};
use qa_site_model::{AuthRequirement, PageModel};
use tracing::info;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const LOGIN_TITLE_KEYWORDS: &[&str] = &["login", "sign in", "log in", "authenticate"];

pub async fn probe_auth_requirements(
    session: &dyn BrowserSession,
    login_url: Option<&str>,
    pages: &mut [PageModel],
) {
    if pages.is_empty() {
        return;
    }
    info!(count = pages.len(), "probing pages for auth requirements");

    let page = match session.new_page().await {
        Ok(page) => page,
        Err(_) => {
            for page_model in pages.iter_mut() {
                page_model.auth_required = AuthRequirement::Unknown;
            }
            return;
        }
    };

    let login_path = login_url
        .and_then(|u| url::Url::parse(u).ok())
        .map(|u| u.path().trim_end_matches('/').to_string())
        .unwrap_or_default();

    for page_model in pages.iter_mut() {
        let navigated = page
            .navigate(&page_model.url, WaitUntil::DomContentLoaded, PROBE_TIMEOUT)
            .await
            .is_ok();

        if !navigated {
            page_model.auth_required = AuthRequirement::Unknown;
            continue;
        }

        let final_url = page.url().await;
        let final_path = url::Url::parse(&final_url)
            .map(|u| u.path().to_string())
            .unwrap_or_default();

        if !login_path.is_empty() && final_path.contains(&login_path) {
            page_model.auth_required = AuthRequirement::Required;
            continue;
        }

        let title = page.title().await.to_lowercase();
        if LOGIN_TITLE_KEYWORDS.iter().any(|kw| title.contains(kw)) {
            page_model.auth_required = AuthRequirement::Required;
        } else {
            page_model.auth_required = AuthRequirement::NotRequired;
        }
    }

    let required = pages.iter().filter(|p| p.auth_required == AuthRequirement::Required).count();
    let public = pages.iter().filter(|p| p.auth_required == AuthRequirement::NotRequired).count();
    info!(required, public, "auth probe complete");
}
