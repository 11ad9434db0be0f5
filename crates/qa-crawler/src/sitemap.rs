//! Sitemap backfill: fetched once, after the first page completes, and
//! enqueued at the lowest priority tier. Grounded on
//! `examples/original_source/src/crawler/crawler.py::_load_sitemap_backfill`.

use std::time::Duration;

use qa_browser_session::{PageHandle, WaitUntil};
use regex::Regex;
use tracing::debug;

use crate::frontier::{Frontier, PRIORITY_SITEMAP};
use crate::scope::is_valid_page_url;

const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);
const SITEMAP_DEPTH: usize = 1;

/// Fetches `{origin}/sitemap.xml` and enqueues every `<loc>` URL as backfill.
/// Any failure (no sitemap, parse error, timeout) degrades to zero URLs
/// queued rather than aborting the crawl.
pub async fn load_sitemap_backfill(
    page: &dyn PageHandle,
    start_url: &str,
    frontier: &mut Frontier,
    normalize: impl Fn(&str) -> Option<String>,
) -> usize {
    let Ok(parsed) = url::Url::parse(start_url) else { return 0 };
    let sitemap_url = format!(
        "{}://{}/sitemap.xml",
        parsed.scheme(),
        parsed.host_str().unwrap_or_default()
    );

    if let Err(err) = page.navigate(&sitemap_url, WaitUntil::DomContentLoaded, SITEMAP_TIMEOUT).await {
        debug!(error = %err, "no sitemap.xml found or failed to load");
        return 0;
    }

    let content = match page.content().await {
        Ok(content) => content,
        Err(_) => return 0,
    };

    let loc_re = Regex::new(r"<loc>\s*(https?://[^<\s]+)\s*</loc>").unwrap();
    let mut count = 0;
    for caps in loc_re.captures_iter(&content) {
        let loc_url = caps[1].to_string();
        if !is_valid_page_url(&loc_url) {
            continue;
        }
        if let Some(normalized) = normalize(&loc_url) {
            if frontier.enqueue(&loc_url, SITEMAP_DEPTH, PRIORITY_SITEMAP, &normalized) {
                count += 1;
            }
        }
    }
    count
}
