//! URL scope and validity filtering. Grounded on
//! `examples/original_source/src/crawler/crawler.py`'s module-level
//! `_is_valid_page_url`/`_is_same_origin`/`_matches_patterns` helpers.

use std::collections::HashSet;

use regex::Regex;
use url::Url;

const SKIP_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".webp", ".css", ".js", ".map", ".woff",
    ".woff2", ".ttf", ".eot", ".pdf", ".zip", ".tar", ".gz", ".mp3", ".mp4", ".webm", ".xml",
    ".rss", ".atom", ".json",
];

/// Rejects non-http(s) schemes and paths ending in a non-page extension
/// (images, fonts, archives, media, feeds/data formats).
pub fn is_valid_page_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else { return false };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let path_lower = parsed.path().to_lowercase();
    !SKIP_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext))
}

pub fn is_same_origin(base_url: &str, candidate_url: &str) -> bool {
    let (Ok(base), Ok(candidate)) = (Url::parse(base_url), Url::parse(candidate_url)) else {
        return false;
    };
    base.host_str() == candidate.host_str() && base.port_or_known_default() == candidate.port_or_known_default()
}

pub fn matches_patterns(url: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        Regex::new(pattern)
            .map(|re| re.is_match(url))
            .unwrap_or(false)
    })
}

pub fn url_in_scope(target_url: &str, url: &str, include: &[String], exclude: &[String]) -> bool {
    if !is_same_origin(target_url, url) {
        return false;
    }
    if !exclude.is_empty() && matches_patterns(url, exclude) {
        return false;
    }
    if !include.is_empty() && !matches_patterns(url, include) {
        return false;
    }
    true
}

/// Resolves a list of (possibly relative) hrefs against `base_url`, strips
/// fragments, and keeps only valid absolute URLs.
pub fn resolve_urls(hrefs: &[String], base_url: &str) -> HashSet<String> {
    let Ok(base) = Url::parse(base_url) else { return HashSet::new() };
    let mut resolved = HashSet::new();
    for href in hrefs {
        let Ok(full) = base.join(href) else { continue };
        let mut clean = format!(
            "{}://{}{}",
            full.scheme(),
            full.host_str().unwrap_or_default(),
            full.path()
        );
        if let Some(port) = full.port() {
            clean = format!(
                "{}://{}:{}{}",
                full.scheme(),
                full.host_str().unwrap_or_default(),
                port,
                full.path()
            );
        }
        if let Some(query) = full.query() {
            clean.push('?');
            clean.push_str(query);
        }
        if is_valid_page_url(&clean) {
            resolved.insert(clean);
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_asset_extensions() {
        assert!(!is_valid_page_url("https://example.com/logo.png"));
        assert!(is_valid_page_url("https://example.com/about"));
    }

    #[test]
    fn rejects_cross_origin() {
        assert!(!is_same_origin("https://example.com", "https://evil.com/x"));
        assert!(is_same_origin("https://example.com/a", "https://example.com/b"));
    }

    #[test]
    fn resolve_urls_handles_relative_paths() {
        let hrefs = vec!["/about".to_string(), "contact".to_string()];
        let resolved = resolve_urls(&hrefs, "https://example.com/home");
        assert!(resolved.contains("https://example.com/about"));
        assert!(resolved.contains("https://example.com/contact"));
    }
}
