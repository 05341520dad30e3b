use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_BINARY_NAME, DEFAULT_INSTALL_ROOT, DEFAULT_LINK_NAME,
    DEFAULT_VERSION_FILE,
};

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Where server versions are unpacked and how the active one is found.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Directory holding `bedrock-server-<version>` directories and the link
    pub root: String,
    /// Stable link pointing at the active install directory
    pub link_name: String,
    /// Server executable inside the install directory
    pub binary: String,
    /// Version marker file inside the install directory
    pub version_file: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            root: String::from(DEFAULT_INSTALL_ROOT),
            link_name: String::from(DEFAULT_LINK_NAME),
            binary: String::from(DEFAULT_BINARY_NAME),
            version_file: String::from(DEFAULT_VERSION_FILE),
        }
    }
}

impl InstallConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        for (field, value) in [
            ("install.link_name", &self.link_name),
            ("install.binary", &self.binary),
            ("install.version_file", &self.version_file),
        ] {
            if value.is_empty() || value.contains('/') || value.contains("..") {
                return Err(ConfigError::install(format!(
                    "{field} must be a plain file name, got '{value}'"
                )));
            }
        }

        if self.root.is_empty() {
            return Err(ConfigError::install("install.root must not be empty"));
        }

        Ok(())
    }

    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// Path of the stable "current server" link.
    pub fn link_path(&self) -> PathBuf {
        Path::new(&self.root).join(&self.link_name)
    }

    /// Version marker as seen through the stable link.
    pub fn version_marker_path(&self) -> PathBuf {
        self.link_path().join(&self.version_file)
    }
}
