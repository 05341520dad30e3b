use crate::{
    ConfigError, ConfigErrorResult, ControlConfig, DaemonConfig, DataConfig, InstallConfig,
    LoggingConfig, ShutdownConfig, UpstreamConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub control: ControlConfig,
    pub install: InstallConfig,
    pub data: DataConfig,
    pub upstream: UpstreamConfig,
    pub shutdown: ShutdownConfig,
    pub daemon: DaemonConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. Check for BD_CONFIG_DIR env var, else use the working directory
    /// 2. Load config.toml if it exists, else use defaults
    /// 3. Apply BD_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_path = Self::config_dir()?.join("config.toml");

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: BD_CONFIG_DIR env var > current working directory
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var("BD_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.control.validate()?;
        self.install.validate()?;
        self.data.validate()?;
        self.upstream.validate()?;
        self.shutdown.validate()?;
        self.daemon.validate()?;

        Ok(())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  control: {} (routes: /shutdown /terminate /healthcheck /message)",
            self.control.bind_addr()
        );
        info!(
            "  install: root={}, link={}, binary={}",
            self.install.root, self.install.link_name, self.install.binary
        );

        let data_root = self.data.root_path();
        info!(
            "  data: root={} ({}), entries={}",
            data_root.display(),
            if data_root.exists() {
                "persistent"
            } else {
                "absent, ephemeral mode"
            },
            self.data.entries.join(",")
        );

        info!(
            "  upstream: {} (timeout {}s)",
            self.upstream.page_url, self.upstream.timeout_secs
        );
        info!(
            "  shutdown: {}x{}s countdown, {}s grace",
            self.shutdown.countdown_steps, self.shutdown.step_secs, self.shutdown.grace_secs
        );

        if self.daemon.heartbeat_secs > 0 {
            info!("  daemon: heartbeat every {}s", self.daemon.heartbeat_secs);
        } else {
            info!("  daemon: heartbeat disabled");
        }

        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
    }

    fn apply_env_overrides(&mut self) {
        // Control
        Self::apply_env_string("BD_CONTROL_HOST", &mut self.control.host);
        Self::apply_env_parse("BD_CONTROL_PORT", &mut self.control.port);

        // Install
        Self::apply_env_string("BD_INSTALL_ROOT", &mut self.install.root);
        Self::apply_env_string("BD_INSTALL_LINK_NAME", &mut self.install.link_name);
        Self::apply_env_string("BD_INSTALL_BINARY", &mut self.install.binary);

        // Data
        Self::apply_env_string("BD_DATA_ROOT", &mut self.data.root);
        Self::apply_env_list("BD_DATA_ENTRIES", &mut self.data.entries);

        // Upstream
        Self::apply_env_string("BD_UPSTREAM_PAGE_URL", &mut self.upstream.page_url);
        Self::apply_env_string("BD_UPSTREAM_USER_AGENT", &mut self.upstream.user_agent);
        Self::apply_env_string(
            "BD_UPSTREAM_DOWNLOAD_PATTERN",
            &mut self.upstream.download_pattern,
        );
        Self::apply_env_string(
            "BD_UPSTREAM_VERSION_PATTERN",
            &mut self.upstream.version_pattern,
        );
        Self::apply_env_parse("BD_UPSTREAM_TIMEOUT_SECS", &mut self.upstream.timeout_secs);

        // Shutdown
        Self::apply_env_parse(
            "BD_SHUTDOWN_COUNTDOWN_STEPS",
            &mut self.shutdown.countdown_steps,
        );
        Self::apply_env_parse("BD_SHUTDOWN_STEP_SECS", &mut self.shutdown.step_secs);
        Self::apply_env_parse("BD_SHUTDOWN_GRACE_SECS", &mut self.shutdown.grace_secs);

        // Daemon
        Self::apply_env_parse("BD_HEARTBEAT_SECS", &mut self.daemon.heartbeat_secs);
        Self::apply_env_option_string("BD_LOCK_FILE", &mut self.daemon.lock_file);

        // Logging
        Self::apply_env_parse("BD_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("BD_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("BD_LOG_FILE", &mut self.logging.file);
        Self::apply_env_string("BD_LOG_DIR", &mut self.logging.dir);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Helper: Apply environment variable override for comma-separated lists
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}
