//! Link discovery strategies: static DOM anchors, SPA router links, dynamic
//! script-attribute URLs, and interactive nav/dropdown revelation. Grounded
//! on `examples/original_source/src/crawler/crawler.py` and
//! `examples/original_source/src/crawler/spa_handler.py`.

use std::collections::HashSet;
use std::time::Duration;

use qa_browser_session::PageHandle;
use serde_json::Value;
use tracing::debug;

use crate::scope::resolve_urls;

const TOGGLE_CLICK_TIMEOUT: Duration = Duration::from_secs(3);
const AFTER_CLICK_SETTLE: Duration = Duration::from_millis(500);
const AFTER_ESCAPE_SETTLE: Duration = Duration::from_millis(300);
const RESTORE_NAV_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_TOGGLES: usize = 8;

const STATIC_LINKS_SCRIPT: &str = r#"
(() => {
    const results = [];
    document.querySelectorAll('a[href]').forEach(el => results.push(el.href));
    document.querySelectorAll('area[href]').forEach(el => results.push(el.href));
    document.querySelectorAll('frame[src], iframe[src]').forEach(el => { if (el.src) results.push(el.src); });
    return results.filter(h => h
        && !h.startsWith('javascript:') && !h.startsWith('mailto:')
        && !h.startsWith('tel:') && !h.startsWith('data:') && !h.startsWith('blob:'));
})()
"#;

pub async fn extract_static_links(page: &dyn PageHandle, base_url: &str) -> HashSet<String> {
    match page.evaluate(STATIC_LINKS_SCRIPT).await {
        Ok(value) => resolve_urls(&strings(&value), base_url),
        Err(err) => {
            debug!(error = %err, "static link extraction failed");
            HashSet::new()
        }
    }
}

const DYNAMIC_LINKS_SCRIPT: &str = r#"
(() => {
    const results = [];

    document.querySelectorAll('[onclick]').forEach(el => {
        const onclick = el.getAttribute('onclick') || '';
        const locMatch = onclick.match(/(?:window\.)?location(?:\.href)?\s*=\s*["']([^"']+)["']/);
        if (locMatch) results.push(locMatch[1]);
        const navMatch = onclick.match(/(?:navigate|goto|redirect|router\.push)\s*\(?\s*["']([^"']+)["']/i);
        if (navMatch) results.push(navMatch[1]);
    });

    const dataAttrs = ['data-href', 'data-url', 'data-link', 'data-to', 'data-route'];
    for (const attr of dataAttrs) {
        document.querySelectorAll(`[${attr}]`).forEach(el => {
            const val = el.getAttribute(attr);
            if (val && (val.startsWith('/') || val.startsWith('http'))) results.push(val);
        });
    }

    document.querySelectorAll('button[formaction], input[formaction]').forEach(el => {
        const val = el.getAttribute('formaction');
        if (val) results.push(val);
    });

    document.querySelectorAll('meta[http-equiv="refresh"]').forEach(el => {
        const content = el.getAttribute('content') || '';
        const match = content.match(/url\s*=\s*["']?([^"';\s]+)/i);
        if (match) results.push(match[1]);
    });

    document.querySelectorAll('form[action]').forEach(el => {
        const action = el.getAttribute('action');
        if (action && action !== '#' && !action.startsWith('javascript:')) results.push(action);
    });

    return results.filter(r => r && !r.startsWith('javascript:'));
})()
"#;

pub async fn extract_dynamic_links(page: &dyn PageHandle, base_url: &str) -> HashSet<String> {
    match page.evaluate(DYNAMIC_LINKS_SCRIPT).await {
        Ok(value) => resolve_urls(&strings(&value), base_url),
        Err(err) => {
            debug!(error = %err, "dynamic link extraction failed");
            HashSet::new()
        }
    }
}

const VISIBLE_LINKS_SCRIPT: &str = r#"
(() => {
    return Array.from(document.querySelectorAll('a[href]'))
        .filter(a => {
            const rect = a.getBoundingClientRect();
            return rect.width > 0 && rect.height > 0;
        })
        .map(a => a.href)
        .filter(h => h && !h.startsWith('javascript:') && !h.startsWith('mailto:') && !h.startsWith('tel:'));
})()
"#;

async fn visible_link_hrefs(page: &dyn PageHandle) -> HashSet<String> {
    match page.evaluate(VISIBLE_LINKS_SCRIPT).await {
        Ok(value) => strings(&value).into_iter().collect(),
        Err(_) => HashSet::new(),
    }
}

const NAV_TOGGLES_SCRIPT: &str = r#"
(() => {
    const selectors = [];
    const candidates = document.querySelectorAll(
        'nav button, nav [role="button"], ' +
        '[class*="menu-toggle"], [class*="hamburger"], [class*="nav-toggle"], ' +
        '[class*="dropdown-toggle"], [aria-haspopup="true"], ' +
        '[data-toggle="dropdown"], [data-bs-toggle="dropdown"], ' +
        'button[aria-expanded="false"], [class*="navbar-toggler"], ' +
        'details > summary'
    );
    for (const el of candidates) {
        if (el.offsetParent === null && !el.closest('details')) continue;
        let sel = '';
        if (el.id) sel = '#' + CSS.escape(el.id);
        else if (el.getAttribute('aria-label')) sel = `[aria-label="${el.getAttribute('aria-label')}"]`;
        else if (el.className && typeof el.className === 'string') {
            const cls = el.className.trim().split(/\s+/)[0];
            if (cls) sel = el.tagName.toLowerCase() + '.' + CSS.escape(cls);
        }
        if (sel) selectors.push(sel);
    }
    return selectors.slice(0, 8);
})()
"#;

/// Clicks each candidate nav/dropdown toggle (capped at `MAX_TOGGLES`),
/// diffing the set of visible anchor hrefs before and after each click to
/// find links that only render once a menu is expanded. Restores the
/// original URL if a click navigated away.
pub async fn discover_interactive_links(page: &dyn PageHandle, base_url: &str) -> HashSet<String> {
    let mut discovered = HashSet::new();

    let toggles = match page.evaluate(NAV_TOGGLES_SCRIPT).await {
        Ok(value) => strings(&value),
        Err(err) => {
            debug!(error = %err, "interactive toggle discovery failed");
            return discovered;
        }
    };

    let links_before = visible_link_hrefs(page).await;
    let original_url = page.url().await;

    for selector in toggles.into_iter().take(MAX_TOGGLES) {
        if !page.is_visible(&selector).await.unwrap_or(false) {
            continue;
        }
        if page.click(&selector, TOGGLE_CLICK_TIMEOUT).await.is_err() {
            debug!(selector = %selector, "interactive toggle click failed");
            continue;
        }
        page.wait_for_timeout(AFTER_CLICK_SETTLE).await;

        let links_after = visible_link_hrefs(page).await;
        let new_links: Vec<String> = links_after.difference(&links_before).cloned().collect();
        discovered.extend(resolve_urls(&new_links, base_url));

        let _ = page.press_escape().await;
        page.wait_for_timeout(AFTER_ESCAPE_SETTLE).await;
    }

    if page.url().await != original_url {
        let _ = page
            .navigate(&original_url, qa_browser_session::WaitUntil::DomContentLoaded, RESTORE_NAV_TIMEOUT)
            .await;
    }

    discovered
}

const SPA_DETECTION_SCRIPT: &str = r#"
(() => {
    const hasReact = !!document.querySelector('[data-reactroot], [data-reactid], #root, #__next');
    const hasVue = !!document.querySelector('[data-v-], #app, [data-server-rendered]');
    const hasAngular = !!document.querySelector('[ng-app], [data-ng-app], app-root');

    const hasHashRouting = window.location.hash.length > 1;

    let routingType = 'traditional';
    if (hasHashRouting) routingType = 'hash';
    else if (hasReact || hasVue || hasAngular) routingType = 'history';

    return {
        is_spa: hasReact || hasVue || hasAngular,
        framework: hasReact ? 'react' : hasVue ? 'vue' : hasAngular ? 'angular' : 'unknown',
        routing_type: routingType,
    };
})()
"#;

/// Returns the routing type (`"traditional" | "hash" | "history"`); a
/// non-traditional result marks the site as an SPA for the rest of the crawl.
pub async fn detect_spa_type(page: &dyn PageHandle) -> String {
    match page.evaluate(SPA_DETECTION_SCRIPT).await {
        Ok(value) => value
            .get("routing_type")
            .and_then(|v| v.as_str())
            .unwrap_or("traditional")
            .to_string(),
        Err(_) => "traditional".to_string(),
    }
}

const SPA_ROUTES_SCRIPT: &str = r#"
(() => {
    const links = document.querySelectorAll('a[href]');
    const routes = [];
    for (const link of links) {
        const href = link.getAttribute('href');
        if (href && (href.startsWith('/') || href.startsWith('#/'))) routes.push(href);
    }
    return [...new Set(routes)];
})()
"#;

/// Resolves SPA-framework anchors (hash-routed or history-routed) against the
/// base origin directly, since relative `#/route` hrefs don't round-trip
/// through `Url::join` the way ordinary paths do.
pub async fn discover_spa_routes(page: &dyn PageHandle, base_url: &str) -> HashSet<String> {
    let mut discovered = HashSet::new();
    let routes = match page.evaluate(SPA_ROUTES_SCRIPT).await {
        Ok(value) => strings(&value),
        Err(err) => {
            debug!(error = %err, "SPA route discovery failed");
            return discovered;
        }
    };

    let Ok(parsed_base) = url::Url::parse(base_url) else { return discovered };
    let origin = format!(
        "{}://{}",
        parsed_base.scheme(),
        parsed_base.host_str().unwrap_or_default()
    );

    for route in routes {
        if let Some(path) = route.strip_prefix("#/") {
            discovered.insert(format!("{origin}/{path}"));
        } else if route.starts_with('/') {
            discovered.insert(format!("{origin}{route}"));
        }
    }
    discovered
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
