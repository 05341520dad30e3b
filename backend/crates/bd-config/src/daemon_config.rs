use crate::{ConfigError, ConfigErrorResult, DEFAULT_HEARTBEAT_SECS};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Interval between liveness log lines (0 = disabled)
    pub heartbeat_secs: u64,
    /// Lock file override; defaults to `<executable>.lock`
    pub lock_file: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            lock_file: None,
        }
    }
}

impl DaemonConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref path) = self.lock_file
            && path.is_empty()
        {
            return Err(ConfigError::daemon("daemon.lock_file must not be empty"));
        }

        Ok(())
    }

    /// Resolve the lock file path, colocated with the executable by default.
    pub fn lock_path(&self) -> ConfigErrorResult<PathBuf> {
        if let Some(ref path) = self.lock_file {
            return Ok(PathBuf::from(path));
        }

        let exe = std::env::current_exe()
            .map_err(|e| ConfigError::daemon(format!("Cannot determine executable path: {e}")))?;

        let mut name = exe.into_os_string();
        name.push(".lock");
        Ok(PathBuf::from(name))
    }
}
