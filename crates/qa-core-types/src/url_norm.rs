//! URL normalization and page-id hashing (component A).
//!
//! Grounded byte-for-byte on the reference implementation: the path is
//! right-trimmed of a trailing `/` (falling back to `/` if that empties it),
//! the query string is split on `&` and the parts sorted lexicographically as
//! whole `key=value` strings, and the fragment is dropped. Scheme and host
//! case are preserved as given — the reference performs no case-folding.

use md5::{Digest, Md5};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum UrlError {
    #[error("invalid URL: {0}")]
    Invalid(String),
}

/// Normalize a URL for deduplication. See module docs for the exact algorithm.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    let parsed = Url::parse(raw).map_err(|e| UrlError::Invalid(e.to_string()))?;

    let scheme = parsed.scheme();
    let netloc = netloc(&parsed);

    let path = {
        let trimmed = parsed.path().trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        }
    };

    let query = match parsed.query() {
        Some(q) if !q.is_empty() => {
            let mut parts: Vec<&str> = q.split('&').collect();
            parts.sort_unstable();
            format!("?{}", parts.join("&"))
        }
        _ => String::new(),
    };

    Ok(format!("{scheme}://{netloc}{path}{query}"))
}

/// Reproduces Python's `urlparse().netloc`: host plus an explicit non-default port.
fn netloc(parsed: &Url) -> String {
    let host = parsed.host_str().unwrap_or_default();
    match parsed.port() {
        Some(p) => format!("{host}:{p}"),
        None => host.to_string(),
    }
}

/// Generate a stable page ID from the normalized URL: first 12 hex chars of MD5.
pub fn page_id_from_url(raw: &str) -> Result<String, UrlError> {
    let normalized = normalize_url(raw)?;
    let digest = Md5::digest(normalized.as_bytes());
    let hex = format!("{digest:x}");
    Ok(hex[..12].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/a/").unwrap(),
            normalize_url("https://example.com/a").unwrap()
        );
    }

    #[test]
    fn root_path_stays_slash() {
        assert_eq!(normalize_url("https://example.com/").unwrap(), "https://example.com/");
        assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com/");
    }

    #[test]
    fn sorts_query_params() {
        let a = normalize_url("https://example.com/x?b=2&a=1").unwrap();
        let b = normalize_url("https://example.com/x?a=1&b=2").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn drops_fragment() {
        let a = normalize_url("https://example.com/x#section").unwrap();
        let b = normalize_url("https://example.com/x").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn preserves_host_case() {
        assert_eq!(normalize_url("https://Example.com/x").unwrap(), "https://Example.com/x");
    }

    #[test]
    fn page_id_is_pure_function_of_normalized_url() {
        let id_a = page_id_from_url("https://example.com/a/?b=2&a=1").unwrap();
        let id_b = page_id_from_url("https://example.com/a?a=1&b=2").unwrap();
        assert_eq!(id_a, id_b);
        assert_eq!(id_a.len(), 12);
    }

    #[test]
    fn includes_non_default_port() {
        assert_eq!(normalize_url("https://example.com:8443/x").unwrap(), "https://example.com:8443/x");
    }
}
