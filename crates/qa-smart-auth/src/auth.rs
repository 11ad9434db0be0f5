//! Selector resolution cascade and the top-level
//! `authenticate_and_capture_state` entry point used by the crawler's auth
//! probe pass and the executor's session-setup step. Grounded on
//! `examples/original_source/src/auth/smart_auth.py::_resolve_selectors`
//! and `::authenticate_and_capture_state`.

use std::time::Duration;

use qa_browser_session::{BrowserSession, PageHandle, StorageState, WaitUntil};
use qa_llm::LlmClient;
use qa_site_model::FormModel;
use tracing::{info, warn};

use crate::detect::{auto_detect, partial_fallback, try_explicit};
use crate::types::{Credentials, ExplicitSelectors, LoginSelectors, SmartAuthResult};
use crate::verify::verify_login_success;
use crate::vision::llm_detect_login_form;

const NAV_TIMEOUT: Duration = Duration::from_secs(30);
const ACTION_TIMEOUT: Duration = Duration::from_secs(10);
const POST_SUBMIT_WAIT: Duration = Duration::from_secs(5);

/// Tries tiers in order: explicit override, heuristic form scoring (with an
/// orphan-field SPA fallback baked into `auto_detect`), LLM vision, and
/// finally a generic partial-selector guess that is never returned as a
/// confident match — callers should treat it as a best-effort attempt only.
pub async fn resolve_selectors(
    page: &dyn PageHandle,
    forms: &[FormModel],
    explicit: Option<&ExplicitSelectors>,
    llm: &dyn LlmClient,
) -> LoginSelectors {
    if let Some(explicit) = explicit {
        if let Some(selectors) = try_explicit(explicit) {
            return selectors;
        }
    }

    if let Some(selectors) = auto_detect(page, forms).await {
        return selectors;
    }

    if let Some(selectors) = llm_detect_login_form(page, llm).await {
        return selectors;
    }

    warn!("smart-auth selector resolution exhausted all tiers, using partial fallback");
    partial_fallback()
}

/// Runs a full login attempt in a disposable session: navigates, resolves
/// selectors, fills and submits the form, verifies success, and — only on
/// success — captures the resulting storage state for reuse by later
/// sessions. The session is always closed on the way out, mirroring the
/// original's try/finally around the disposable context.
pub async fn authenticate_and_capture_state(
    session: Box<dyn BrowserSession>,
    login_url: &str,
    credentials: &Credentials,
    explicit: Option<&ExplicitSelectors>,
    llm: &dyn LlmClient,
    success_indicator: Option<&str>,
) -> SmartAuthResult {
    let result = run_attempt(session.as_ref(), login_url, credentials, explicit, llm, success_indicator).await;
    if let Err(err) = session.close().await {
        warn!(error = %err, "failed to close disposable auth session");
    }
    result
}

async fn run_attempt(
    session: &dyn BrowserSession,
    login_url: &str,
    credentials: &Credentials,
    explicit: Option<&ExplicitSelectors>,
    llm: &dyn LlmClient,
    success_indicator: Option<&str>,
) -> SmartAuthResult {
    let page = match session.new_page().await {
        Ok(page) => page,
        Err(err) => return SmartAuthResult::failure(format!("failed to open page: {err}")),
    };

    if let Err(err) = page.navigate(login_url, WaitUntil::DomContentLoaded, NAV_TIMEOUT).await {
        return SmartAuthResult::failure(format!("navigation to login page failed: {err}"));
    }
    let _ = page.wait_for_load_state(WaitUntil::NetworkIdle, NAV_TIMEOUT).await;

    let forms = qa_site_model::analyze_forms(page.as_ref()).await;
    let selectors = resolve_selectors(page.as_ref(), &forms, explicit, llm).await;

    if !page.exists(&selectors.password_selector).await.unwrap_or(false) {
        return SmartAuthResult::failure(format!(
            "resolved password selector `{}` not present on page",
            selectors.password_selector
        ));
    }

    if let Some(username_selector) = &selectors.username_selector {
        if let Err(err) = page.fill(username_selector, &credentials.username, ACTION_TIMEOUT).await {
            warn!(selector = %username_selector, error = %err, "failed to fill username field");
        }
    }
    if let Err(err) = page.fill(&selectors.password_selector, &credentials.password, ACTION_TIMEOUT).await {
        return SmartAuthResult::failure(format!("failed to fill password field: {err}"));
    }

    let original_url = page.url().await;
    match &selectors.submit_selector {
        Some(submit_selector) => {
            if let Err(err) = page.click(submit_selector, ACTION_TIMEOUT).await {
                return SmartAuthResult::failure(format!("failed to click submit: {err}"));
            }
        }
        None => {
            if let Err(err) = page.press_key("Enter").await {
                return SmartAuthResult::failure(format!("failed to submit via Enter key: {err}"));
            }
        }
    }
    page.wait_for_timeout(POST_SUBMIT_WAIT).await;

    let success = verify_login_success(
        page.as_ref(),
        &original_url,
        &selectors.password_selector,
        success_indicator,
    )
    .await;

    if !success {
        return SmartAuthResult {
            success: false,
            selectors: Some(selectors),
            storage_state: None,
            failure_reason: Some("login verification failed".to_string()),
        };
    }

    info!(method = selectors.detection_method.as_str(), "smart-auth login succeeded");
    let storage_state: Option<StorageState> = match session.capture_storage_state().await {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(error = %err, "login succeeded but storage state capture failed");
            None
        }
    };

    SmartAuthResult {
        success: true,
        selectors: Some(selectors),
        storage_state,
        failure_reason: None,
    }
}
