//! Smart selector resolution — tries progressively broader strategies to
//! find an element before an action gives up. Grounded on
//! `examples/original_source/src/executor/selector_resolver.py`.

use std::time::Duration;

use qa_browser_session::PageHandle;
use regex::Regex;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct SelectorAttempt {
    pub strategy: String,
    pub selector: String,
    pub success: bool,
}

#[derive(Clone, Debug)]
pub struct SelectorResolutionResult {
    pub resolved_selector: Option<String>,
    pub strategy_used: String,
    pub attempts: Vec<SelectorAttempt>,
}

async fn try_selector(page: &dyn PageHandle, selector: &str, timeout: Duration) -> bool {
    page.wait_for_selector(selector, timeout).await.is_ok()
}

/// Strategy order: (1) original selector at the full timeout, (2)
/// alternatives derived from the original at short timeouts, (3) a DOM
/// stability wait followed by one more retry of the original.
pub async fn resolve_selector(
    page: &dyn PageHandle,
    original_selector: &str,
    timeout: Duration,
    action_type: &str,
) -> SelectorResolutionResult {
    let mut attempts = Vec::new();

    if try_selector(page, original_selector, timeout).await {
        return SelectorResolutionResult {
            resolved_selector: Some(original_selector.to_string()),
            strategy_used: "original".to_string(),
            attempts: vec![SelectorAttempt {
                strategy: "original".to_string(),
                selector: original_selector.to_string(),
                success: true,
            }],
        };
    }
    attempts.push(SelectorAttempt {
        strategy: "original".to_string(),
        selector: original_selector.to_string(),
        success: false,
    });
    debug!("smart resolve: original selector '{original_selector}' not found, trying alternatives");

    let alt_timeout = Duration::from_millis(2000.min(timeout.as_millis() as u64 / 3));
    for (alt_strategy, alt_selector) in derive_alternatives(original_selector, action_type) {
        if try_selector(page, &alt_selector, alt_timeout).await {
            info!("smart resolve: '{original_selector}' -> '{alt_selector}' via {alt_strategy}");
            attempts.push(SelectorAttempt {
                strategy: alt_strategy.clone(),
                selector: alt_selector.clone(),
                success: true,
            });
            return SelectorResolutionResult {
                resolved_selector: Some(alt_selector),
                strategy_used: alt_strategy,
                attempts,
            };
        }
        attempts.push(SelectorAttempt {
            strategy: alt_strategy,
            selector: alt_selector,
            success: false,
        });
    }

    let stability_timeout = Duration::from_millis(2000.min(timeout.as_millis() as u64 / 4));
    let _ = page.wait_for_load_state(qa_browser_session::WaitUntil::NetworkIdle, stability_timeout).await;
    if try_selector(page, original_selector, alt_timeout).await {
        info!("smart resolve: '{original_selector}' succeeded after DOM stability wait");
        attempts.push(SelectorAttempt {
            strategy: "dom_stability_retry".to_string(),
            selector: original_selector.to_string(),
            success: true,
        });
        return SelectorResolutionResult {
            resolved_selector: Some(original_selector.to_string()),
            strategy_used: "dom_stability_retry".to_string(),
            attempts,
        };
    }
    attempts.push(SelectorAttempt {
        strategy: "dom_stability_retry".to_string(),
        selector: original_selector.to_string(),
        success: false,
    });

    debug!(
        "smart resolve: all strategies failed for '{original_selector}' ({} attempts)",
        attempts.len()
    );
    SelectorResolutionResult {
        resolved_selector: None,
        strategy_used: "none".to_string(),
        attempts,
    }
}

/// Derives alternative selectors from the original. Only returns
/// alternatives that differ from the original and from each other.
fn derive_alternatives(original_selector: &str, action_type: &str) -> Vec<(String, String)> {
    let mut alternatives = Vec::new();
    let mut seen = std::collections::HashSet::new();
    seen.insert(original_selector.to_string());

    let mut add = |strategy: &str, selector: String| {
        if !selector.is_empty() && !seen.contains(&selector) {
            seen.insert(selector.clone());
            alternatives.push((strategy.to_string(), selector));
        }
    };

    if let Some(caps) = Regex::new(r"#([\w-]+)").unwrap().captures(original_selector) {
        add("id_only", format!("#{}", &caps[1]));
    }
    if let Some(caps) = Regex::new(r#"\[name=['"]?([\w-]+)['"]?\]"#).unwrap().captures(original_selector) {
        add("name_attr", format!("[name=\"{}\"]", &caps[1]));
    }
    if let Some(caps) = Regex::new(r#"\[placeholder=['"]?([^'"]+)['"]?\]"#).unwrap().captures(original_selector) {
        add("placeholder", format!("[placeholder=\"{}\"]", &caps[1]));
    }
    if let Some(caps) = Regex::new(r#"\[aria-label=['"]?([^'"]+)['"]?\]"#).unwrap().captures(original_selector) {
        add("aria_label", format!("[aria-label=\"{}\"]", &caps[1]));
    }
    if let Some(caps) = Regex::new(r#"(?i)text[=~]*['"]([^'"]+)['"]"#).unwrap().captures(original_selector) {
        add("text_selector", format!("text={}", &caps[1]));
    }
    if matches!(action_type, "click" | "hover") {
        if let Some(caps) = Regex::new(r#":has-text\(['"]([^'"]+)['"]\)"#).unwrap().captures(original_selector) {
            add("has_text", format!("text={}", &caps[1]));
        }
    }
    if let Some(relaxed) = relax_css_selector(original_selector) {
        add("relaxed_css", relaxed);
    }

    alternatives
}

/// Simplifies a complex CSS selector by removing pseudo-classes and deep
/// nesting. Returns `None` for Playwright-style pseudo-selectors
/// (`text=`, `role=`, `data-testid=`) or if nothing was actually simplified.
fn relax_css_selector(selector: &str) -> Option<String> {
    if Regex::new(r"^(text|role|data-testid)=").unwrap().is_match(selector) {
        return None;
    }

    let mut relaxed = selector.to_string();
    relaxed = Regex::new(r":nth-child\([^)]+\)").unwrap().replace_all(&relaxed, "").into_owned();
    relaxed = Regex::new(r":(first|last)-child").unwrap().replace_all(&relaxed, "").into_owned();
    relaxed = Regex::new(r":not\([^)]+\)").unwrap().replace_all(&relaxed, "").into_owned();
    relaxed = Regex::new(r":has-text\([^)]+\)").unwrap().replace_all(&relaxed, "").into_owned();

    let parts: Vec<&str> = relaxed.split_whitespace().collect();
    if parts.len() > 3 {
        relaxed = parts[parts.len() - 2..].join(" ");
    } else {
        relaxed = parts.join(" ");
    }
    let relaxed = relaxed.trim().to_string();

    if !relaxed.is_empty() && relaxed != selector {
        Some(relaxed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_id_only_alternative_from_tag_qualified_id() {
        let alts = derive_alternatives("div#login-btn", "click");
        assert!(alts.iter().any(|(s, sel)| s == "id_only" && sel == "#login-btn"));
    }

    #[test]
    fn relaxes_nth_child_pseudo_class() {
        let relaxed = relax_css_selector("ul li:nth-child(3) a").unwrap();
        assert!(!relaxed.contains("nth-child"));
    }

    #[test]
    fn does_not_relax_playwright_text_selectors() {
        assert!(relax_css_selector("text=Submit").is_none());
    }

    #[test]
    fn has_text_alternative_only_for_click_and_hover() {
        let sel = "button:has-text('Submit')";
        assert!(derive_alternatives(sel, "click").iter().any(|(s, _)| s == "has_text"));
        assert!(!derive_alternatives(sel, "fill").iter().any(|(s, _)| s == "has_text"));
    }
}
