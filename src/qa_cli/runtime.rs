use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use qa_config::FrameworkConfig;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn load_local_env_overrides() {
    let path = Path::new("config/local.env");
    if !path.exists() {
        return;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    warn!(line = idx + 1, "invalid local.env entry; skipping");
                    continue;
                };
                let key = key.trim();
                if key.is_empty() || env::var(key).is_ok() {
                    continue;
                }
                let normalized = unescape_value(value.trim());
                env::set_var(key, normalized);
            }
            info!(path = %path.display(), "loaded environment overrides from local.env");
        }
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
        }
    }
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug { tracing::Level::DEBUG } else { level.parse().context("invalid log level")? };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: FrameworkConfig,
    pub path: PathBuf,
}

/// Loads the framework config: explicit `--config` path, else `./qa.config.json`,
/// else `~/.config/qa-engine/config.json`. A missing file is not fatal; the
/// same deterministic defaults `FrameworkConfig` already carries apply, with
/// a warning, mirroring the original's "using defaults" fallback.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let path = match config_path {
        Some(path) => path.clone(),
        None => {
            let local = PathBuf::from("qa.config.json");
            if local.exists() {
                local
            } else {
                let mut path = dirs::config_dir().context("failed to resolve config directory")?;
                path.push("qa-engine");
                path.push("config.json");
                path
            }
        }
    };

    if path.exists() {
        let mut config = FrameworkConfig::load(&path).context("failed to load framework config")?;
        config.apply_defaults().context("failed to resolve config defaults")?;
        info!(path = %path.display(), "loaded framework config");
        Ok(LoadedConfig { config, path })
    } else {
        warn!(path = %path.display(), "config file not found, using defaults");
        Ok(LoadedConfig { config: FrameworkConfig::default(), path })
    }
}

fn unescape_value(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner.replace("\\\"", "\"").replace("\\n", "\n").replace("\\r", "\r").replace("\\t", "\t")
    } else {
        value.to_string()
    }
}
