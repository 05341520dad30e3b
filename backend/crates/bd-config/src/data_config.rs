use crate::{ConfigError, ConfigErrorResult, DEFAULT_DATA_ENTRIES, DEFAULT_DATA_ROOT};

use std::path::PathBuf;

use serde::Deserialize;

/// Persistent world/config data kept outside the install directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// When this directory does not exist, data reconciliation is skipped.
    pub root: String,
    pub entries: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: String::from(DEFAULT_DATA_ROOT),
            entries: DEFAULT_DATA_ENTRIES.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl DataConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for entry in &self.entries {
            if entry.is_empty() || entry.contains('/') || entry.contains("..") {
                return Err(ConfigError::config(format!(
                    "data.entries must be plain names, got '{entry}'"
                )));
            }
        }

        Ok(())
    }

    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}
