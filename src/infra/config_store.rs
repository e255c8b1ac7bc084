// ============================================================
// Layer 6 — Config Store
// ============================================================
// Saves and restores a DatasetConfig as pretty-printed JSON so a
// run can be reproduced with `inspect --config <file>`.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::application::config::DatasetConfig;

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn save(&self, cfg: &DatasetConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create '{}'", parent.display()))?;
            }
        }

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write config to '{}'", self.path.display()))?;

        tracing::debug!("Saved dataset config to '{}'", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<DatasetConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read config from '{}'", self.path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", self.path.display()))
    }
}
