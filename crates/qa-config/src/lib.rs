//! `FrameworkConfig` and friends — the operator-facing configuration surface
//! for a run: target, auth, crawl scope, test categories, AI model and
//! limits, coverage retention, viewports, and reporting. Grounded on
//! `examples/original_source/src/models/config.py`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment variable `{0}` referenced by `env:{0}` is not set")]
    MissingEnvVar(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub name: String,
}

fn default_viewports() -> Vec<ViewportConfig> {
    vec![
        ViewportConfig { width: 1280, height: 720, name: "desktop".to_string() },
        ViewportConfig { width: 768, height: 1024, name: "tablet".to_string() },
        ViewportConfig { width: 375, height: 812, name: "mobile".to_string() },
    ]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub target_url: String,
    pub max_pages: usize,
    pub max_depth: usize,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub same_origin_only: bool,
    pub wait_for_idle: bool,
    pub user_agent: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            max_pages: 50,
            max_depth: 5,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            same_origin_only: true,
            wait_for_idle: true,
            user_agent: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: ViewportConfig,
    pub record_video: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: ViewportConfig { width: 1280, height: 720, name: "desktop".to_string() },
            record_video: false,
        }
    }
}

/// Login selectors default to CSS lists broad enough to match common login
/// forms without operator configuration; `password` is always resolved
/// through `env:VAR` indirection so secrets never live in plaintext config.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub login_url: String,
    pub username: String,
    pub password: String,
    pub username_selector: String,
    pub password_selector: String,
    pub submit_selector: String,
    pub success_indicator: String,
    pub auto_detect: bool,
    pub llm_fallback: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: String::new(),
            username: String::new(),
            password: String::new(),
            username_selector: "input[name='username'], input[type='email']".to_string(),
            password_selector: "input[name='password'], input[type='password']".to_string(),
            submit_selector: "button[type='submit']".to_string(),
            success_indicator: String::new(),
            auto_detect: true,
            llm_fallback: true,
        }
    }
}

impl AuthConfig {
    /// Resolves `password` through `env:VAR_NAME` indirection, mirroring the
    /// original's Pydantic validator so credentials never sit in plaintext
    /// config files committed to a repo.
    pub fn resolve_env_password(&mut self) -> Result<(), ConfigError> {
        if let Some(var_name) = self.password.strip_prefix("env:") {
            let resolved = std::env::var(var_name)
                .map_err(|_| ConfigError::MissingEnvVar(var_name.to_string()))?;
            self.password = resolved;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub target_url: String,
    pub auth: Option<AuthConfig>,
    pub browser: BrowserConfig,
    pub crawl: CrawlConfig,

    /// functional, visual, security
    pub categories: Vec<String>,

    pub max_tests_per_run: usize,
    pub max_execution_time_seconds: u64,
    pub max_parallel_contexts: usize,

    pub ai_model: String,
    pub ai_max_fallback_calls_per_test: u32,
    pub ai_max_planning_tokens: u32,

    pub staleness_threshold_days: u32,
    pub history_retention_runs: usize,

    pub visual_diff_tolerance: f64,
    pub viewports: Vec<ViewportConfig>,

    pub security_xss_payloads: Vec<String>,
    pub security_max_probe_depth: u32,

    pub report_formats: Vec<ReportFormat>,
    pub report_output_dir: PathBuf,
    pub capture_video: bool,

    pub hints: Vec<String>,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            auth: None,
            browser: BrowserConfig::default(),
            crawl: CrawlConfig::default(),
            categories: vec!["functional".into(), "visual".into(), "security".into()],
            max_tests_per_run: 100,
            max_execution_time_seconds: 1800,
            max_parallel_contexts: 3,
            ai_model: "claude-3-5-sonnet-latest".to_string(),
            ai_max_fallback_calls_per_test: 3,
            ai_max_planning_tokens: 32_000,
            staleness_threshold_days: 7,
            history_retention_runs: 20,
            visual_diff_tolerance: 0.05,
            viewports: default_viewports(),
            security_xss_payloads: vec![
                "<script>alert(1)</script>".to_string(),
                "\"><img src=x onerror=alert(1)>".to_string(),
                "javascript:alert(1)".to_string(),
                "'-alert(1)-'".to_string(),
                "<svg onload=alert(1)>".to_string(),
            ],
            security_max_probe_depth: 2,
            report_formats: vec![ReportFormat::Html, ReportFormat::Json],
            report_output_dir: PathBuf::from("./qa-reports"),
            capture_video: false,
            hints: Vec::new(),
        }
    }
}

impl FrameworkConfig {
    /// Loads a config from a JSON file, layering `QA_`-prefixed environment
    /// variables on top (e.g. `QA_CRAWL__MAX_PAGES=20`), backfills
    /// `crawl.target_url` from the top-level target when unset, and resolves
    /// `env:`-indirected passwords.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let layered = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(config::Environment::with_prefix("QA").separator("__"))
            .build()
            .map_err(|err| ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
            })?;
        let mut config: FrameworkConfig = layered
            .try_deserialize()
            .map_err(|err| ConfigError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
            })?;
        config.apply_defaults()?;
        Ok(config)
    }

    pub fn apply_defaults(&mut self) -> Result<(), ConfigError> {
        if self.crawl.target_url.is_empty() {
            self.crawl.target_url = self.target_url.clone();
        }
        if let Some(auth) = &mut self.auth {
            auth.resolve_env_password()?;
        }
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backfills_crawl_target_url_from_top_level() {
        let mut config = FrameworkConfig {
            target_url: "https://example.com".to_string(),
            ..Default::default()
        };
        config.apply_defaults().unwrap();
        assert_eq!(config.crawl.target_url, "https://example.com");
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = FrameworkConfig {
            target_url: "https://example.com".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = FrameworkConfig::load(&path).unwrap();
        assert_eq!(loaded.target_url, "https://example.com");
        assert_eq!(loaded.crawl.target_url, "https://example.com");
    }

    #[test]
    fn missing_env_var_errors() {
        let mut auth = AuthConfig {
            password: "env:QA_DEFINITELY_UNSET_VAR".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            auth.resolve_env_password(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
