//! Post-login verification cascade. Grounded on
//! `examples/original_source/src/auth/smart_auth.py::_verify_login_success`.

use std::time::Duration;

use qa_browser_session::{PageHandle, WaitUntil};

const SUCCESS_INDICATOR_TIMEOUT: Duration = Duration::from_secs(5);
const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Five-step cascade: an explicit `success_indicator` selector is decisive
/// either way (its absence after the whole cascade is a hard failure); absent
/// an indicator, a URL change or the password field disappearing is treated
/// as evidence of success, and the final fallback assumes success since a
/// non-erroring navigation with no failure signal is the common case for
/// sites the operator didn't configure a success indicator for.
pub async fn verify_login_success(
    page: &dyn PageHandle,
    original_url: &str,
    password_selector: &str,
    success_indicator: Option<&str>,
) -> bool {
    if let Some(indicator) = success_indicator {
        if page
            .wait_for_selector(indicator, SUCCESS_INDICATOR_TIMEOUT)
            .await
            .is_ok()
        {
            return true;
        }
    }

    let _ = page
        .wait_for_load_state(WaitUntil::NetworkIdle, NETWORK_IDLE_TIMEOUT)
        .await;

    let current_url = page.url().await;
    if current_url != original_url && success_indicator.is_none() {
        return true;
    }

    let password_gone = !page.exists(password_selector).await.unwrap_or(true);
    if password_gone && success_indicator.is_none() {
        return true;
    }

    success_indicator.is_none()
}
