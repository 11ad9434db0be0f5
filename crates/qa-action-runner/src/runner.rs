//! Translates `Action` plan steps into `PageHandle` calls. Grounded on
//! `examples/original_source/src/executor/action_runner.py`'s `run_action`.

use std::time::Duration;

use qa_browser_session::stealth::{delay_range_for_action, human_delay};
use qa_browser_session::{PageHandle, WaitUntil};
use qa_planner::Action;
use tracing::{debug, warn};

use crate::errors::ActionRunnerError;
use crate::selector_resolver::resolve_selector;

async fn resolve_effective_selector(
    page: &dyn PageHandle,
    selector: &str,
    timeout: Duration,
    action_type: &str,
    smart_resolve: bool,
) -> String {
    if !smart_resolve {
        return selector.to_string();
    }
    let result = resolve_selector(page, selector, timeout, action_type).await;
    match result.resolved_selector {
        Some(resolved) => {
            if result.strategy_used != "original" {
                tracing::info!(
                    "smart resolve: '{selector}' -> '{resolved}' via {}",
                    result.strategy_used
                );
            }
            resolved
        }
        // All strategies failed — fall through to the original so the
        // underlying driver raises its normal not-found error.
        None => selector.to_string(),
    }
}

async fn delay_for(action_type: &str) {
    let (min_ms, max_ms) = delay_range_for_action(action_type);
    human_delay(min_ms, max_ms).await;
}

/// Executes a single plan action. `smart_resolve` gates whether selector
/// resolution tries alternatives before giving up (disabled for
/// deterministic replays where the original selector must be exact).
pub async fn run_action(
    page: &dyn PageHandle,
    action: &Action,
    timeout: Duration,
    smart_resolve: bool,
) -> Result<(), ActionRunnerError> {
    debug!(
        "running action: {} | selector={:?} | value={:?} | {}",
        action.action_type, action.selector, action.value, action.description
    );

    match action.action_type.as_str() {
        "navigate" => {
            let url = action.value.clone().or_else(|| action.selector.clone()).unwrap_or_default();
            debug!("navigating to {url}...");
            page.navigate(&url, WaitUntil::DomContentLoaded, timeout).await?;
            if page
                .wait_for_load_state(WaitUntil::NetworkIdle, timeout.min(Duration::from_secs(10)))
                .await
                .is_err()
            {
                debug!("network idle timeout, continuing");
            }
        }

        "click" => {
            let selector = require_selector(action, "click")?;
            delay_for("click").await;
            let effective = resolve_effective_selector(page, selector, timeout, "click", smart_resolve).await;
            debug!("clicking: {effective}");
            page.click(&effective, timeout).await?;
        }

        "fill" => {
            let selector = require_selector(action, "fill")?;
            delay_for("fill").await;
            let effective = resolve_effective_selector(page, selector, timeout, "fill", smart_resolve).await;
            let logged_value = if selector.to_lowercase().contains("password") { "***" } else { action.value.as_deref().unwrap_or("") };
            debug!("filling {effective} with '{logged_value}'");
            page.fill(&effective, action.value.as_deref().unwrap_or(""), timeout).await?;
        }

        "select" => {
            let selector = require_selector(action, "select")?;
            delay_for("select").await;
            let effective = resolve_effective_selector(page, selector, timeout, "select", smart_resolve).await;
            debug!("selecting '{:?}' in {effective}", action.value);
            page.select(&effective, action.value.as_deref().unwrap_or(""), timeout).await?;
        }

        "hover" => {
            let selector = require_selector(action, "hover")?;
            delay_for("hover").await;
            let effective = resolve_effective_selector(page, selector, timeout, "hover", smart_resolve).await;
            debug!("hovering over: {effective}");
            page.hover(&effective, timeout).await?;
        }

        "scroll" => {
            if let Some(value) = &action.value {
                debug!("scrolling to y={value}");
                let y: i64 = value.parse().unwrap_or(0);
                page.scroll_to_y(y).await?;
            } else if let Some(selector) = &action.selector {
                debug!("scrolling element into view: {selector}");
                page.scroll_to_selector(selector).await?;
            } else {
                debug!("scrolling to bottom of page");
                page.scroll_to_bottom().await?;
            }
        }

        "wait" => {
            if let Some(selector) = &action.selector {
                let effective = resolve_effective_selector(page, selector, timeout, "wait", smart_resolve).await;
                debug!("waiting for selector: {effective}");
                page.wait_for_selector(&effective, timeout).await?;
            } else if let Some(value) = &action.value {
                debug!("waiting {value}ms...");
                let ms: u64 = value.parse().unwrap_or(1000);
                page.wait_for_timeout(Duration::from_millis(ms)).await;
            } else {
                debug!("waiting 1000ms...");
                page.wait_for_timeout(Duration::from_millis(1000)).await;
            }
        }

        "screenshot" => {
            debug!("screenshot action (handled by evidence collector)");
        }

        "keyboard" => {
            let key = action.value.as_deref().unwrap_or("Enter");
            debug!("pressing key: {key}");
            page.press_key(key).await?;
        }

        other => {
            warn!("unknown action type: {other}");
        }
    }

    Ok(())
}

fn require_selector<'a>(action: &'a Action, action_type: &str) -> Result<&'a str, ActionRunnerError> {
    action.selector.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| ActionRunnerError::MissingSelector {
        action_type: action_type.to_string(),
    })
}
