//! Visual baseline registry — stores and manages screenshot baselines for
//! visual diff testing. Grounded on
//! `examples/original_source/src/coverage/visual_baseline_registry.py` and
//! `examples/original_source/src/models/visual_baseline.py`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::registry::CoverageError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub page_id: String,
    pub viewport_name: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Relative path from `baselines_dir` to the PNG.
    pub image_path: String,
    pub captured_at: String,
    pub run_id: String,
    /// SHA-256 hex digest of the stored image.
    pub image_hash: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualBaselineRegistry {
    pub target_url: String,
    pub last_updated: String,
    /// key format: "{page_id}__{viewport_name}"
    pub baselines: HashMap<String, BaselineEntry>,
}

impl VisualBaselineRegistry {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }
}

fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub struct VisualBaselineRegistryManager {
    registry_path: PathBuf,
    baselines_dir: PathBuf,
    target_url: String,
}

impl VisualBaselineRegistryManager {
    pub fn new(registry_path: impl Into<PathBuf>, baselines_dir: impl Into<PathBuf>, target_url: impl Into<String>) -> Self {
        Self {
            registry_path: registry_path.into(),
            baselines_dir: baselines_dir.into(),
            target_url: target_url.into(),
        }
    }

    pub fn load(&self) -> VisualBaselineRegistry {
        if self.registry_path.exists() {
            match std::fs::read_to_string(&self.registry_path) {
                Ok(text) => match serde_json::from_str(&text) {
                    Ok(registry) => return registry,
                    Err(err) => warn!("failed to parse visual baseline registry, creating new: {err}"),
                },
                Err(err) => warn!("failed to read visual baseline registry, creating new: {err}"),
            }
        }
        VisualBaselineRegistry::new(self.target_url.clone())
    }

    pub fn save(&self, registry: &mut VisualBaselineRegistry) -> Result<(), CoverageError> {
        if let Some(parent) = self.registry_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoverageError::Write {
                path: self.registry_path.clone(),
                source,
            })?;
        }
        registry.last_updated = now_iso();
        let text = serde_json::to_string_pretty(registry).map_err(|err| CoverageError::Write {
            path: self.registry_path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string()),
        })?;
        std::fs::write(&self.registry_path, text).map_err(|source| CoverageError::Write {
            path: self.registry_path.clone(),
            source,
        })?;
        Ok(())
    }

    fn baseline_key(page_id: &str, viewport_name: &str) -> String {
        format!("{page_id}__{viewport_name}")
    }

    fn image_path(&self, page_id: &str, viewport_name: &str) -> PathBuf {
        self.baselines_dir.join("images").join(page_id).join(format!("{viewport_name}.png"))
    }

    /// Looks up an existing baseline, returning `None` if the registry has
    /// no entry or the backing image file has gone missing on disk.
    pub fn get_baseline<'a>(&self, registry: &'a VisualBaselineRegistry, page_id: &str, viewport_name: &str) -> Option<&'a BaselineEntry> {
        let key = Self::baseline_key(page_id, viewport_name);
        let entry = registry.baselines.get(&key)?;
        let abs_path = self.baselines_dir.join(&entry.image_path);
        if !abs_path.exists() {
            warn!("baseline image missing for {key}: {}", abs_path.display());
            return None;
        }
        Some(entry)
    }

    pub fn get_baseline_image_path(&self, entry: &BaselineEntry) -> PathBuf {
        self.baselines_dir.join(&entry.image_path)
    }

    /// Copies a captured screenshot into the baselines directory and
    /// registers it, computing a SHA-256 digest of the stored bytes.
    pub fn store_baseline(
        &self,
        registry: &mut VisualBaselineRegistry,
        page_id: &str,
        viewport_name: &str,
        viewport_width: u32,
        viewport_height: u32,
        source_image_path: &Path,
        run_id: &str,
    ) -> Result<BaselineEntry, CoverageError> {
        let dest = self.image_path(page_id, viewport_name);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CoverageError::Write { path: dest.clone(), source })?;
        }
        std::fs::copy(source_image_path, &dest).map_err(|source| CoverageError::Write { path: dest.clone(), source })?;

        let bytes = std::fs::read(&dest).map_err(|source| CoverageError::Read { path: dest.clone(), source })?;
        let image_hash = format!("{:x}", Sha256::digest(&bytes));

        let rel_path = dest
            .strip_prefix(&self.baselines_dir)
            .unwrap_or(&dest)
            .to_string_lossy()
            .into_owned();

        let entry = BaselineEntry {
            page_id: page_id.to_string(),
            viewport_name: viewport_name.to_string(),
            viewport_width,
            viewport_height,
            image_path: rel_path,
            captured_at: now_iso(),
            run_id: run_id.to_string(),
            image_hash,
        };

        let key = Self::baseline_key(page_id, viewport_name);
        info!("stored baseline for {key} ({viewport_width}x{viewport_height})");
        registry.baselines.insert(key, entry.clone());
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn store_then_retrieve_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let baselines_dir = dir.path().join("baselines");
        let source = dir.path().join("shot.png");
        std::fs::File::create(&source).unwrap().write_all(b"fake png bytes").unwrap();

        let manager = VisualBaselineRegistryManager::new(
            dir.path().join("registry.json"),
            &baselines_dir,
            "https://example.com",
        );
        let mut registry = manager.load();
        manager.store_baseline(&mut registry, "p1", "desktop", 1280, 720, &source, "run-1").unwrap();

        let entry = manager.get_baseline(&registry, "p1", "desktop").expect("baseline present");
        assert_eq!(entry.viewport_width, 1280);
        assert!(manager.get_baseline_image_path(entry).exists());
    }

    #[test]
    fn missing_image_file_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = VisualBaselineRegistryManager::new(
            dir.path().join("registry.json"),
            dir.path().join("baselines"),
            "https://example.com",
        );
        let mut registry = VisualBaselineRegistry::new("https://example.com");
        registry.baselines.insert(
            "p1__desktop".to_string(),
            BaselineEntry {
                page_id: "p1".to_string(),
                viewport_name: "desktop".to_string(),
                viewport_width: 1280,
                viewport_height: 720,
                image_path: "images/p1/desktop.png".to_string(),
                captured_at: "2026-01-01T00:00:00Z".to_string(),
                run_id: "run-1".to_string(),
                image_hash: "deadbeef".to_string(),
            },
        );
        assert!(manager.get_baseline(&registry, "p1", "desktop").is_none());
    }
}
