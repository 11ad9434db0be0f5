//! Shared primitives: run/test/session ids, URL normalization, page-id hashing.
#![allow(dead_code)]

mod url_norm;
#[cfg(feature = "serde-full")]
mod test_result;

pub use url_norm::{normalize_url, page_id_from_url, UrlError};
#[cfg(feature = "serde-full")]
pub use test_result::{
    AssertionResult, Evidence, FallbackRecord, RunResult, StepResult, TestResult,
};

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Umbrella error for glue code that doesn't warrant its own enum.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("{message}")]
    Message { message: String },
}

impl CoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// The 12-hex-char page identifier derived from a normalized URL (see `page_id_from_url`).
/// Unlike `SessionId`/`RunId`, this is never random — it is a pure function of its URL.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PageId(pub String);

impl PageId {
    pub fn from_url(url: &str) -> Result<Self, UrlError> {
        Ok(Self(page_id_from_url(url)?))
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! uuid_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(SessionId, "Identifies one isolated browser session, acquired and released per test.");
uuid_id!(RunId, "Identifies one executor run (a full pass over a TestPlan).");
uuid_id!(PlanId, "Identifies one generated TestPlan.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_id_is_stable_for_equal_ids() {
        let a = PageId::from_url("https://example.com/a").unwrap();
        let b = PageId::from_url("https://example.com/a").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
