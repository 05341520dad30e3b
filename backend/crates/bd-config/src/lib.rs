mod config;
mod control_config;
mod daemon_config;
mod data_config;
mod error;
mod install_config;
mod log_level;
mod logging_config;
mod shutdown_config;
mod upstream_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use control_config::ControlConfig;
pub use daemon_config::DaemonConfig;
pub use data_config::DataConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use install_config::InstallConfig;
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use shutdown_config::ShutdownConfig;
pub use upstream_config::UpstreamConfig;

// Control interface
const DEFAULT_CONTROL_HOST: &str = "127.0.0.1";
const DEFAULT_CONTROL_PORT: u16 = 8090;
const MIN_PORT: u16 = 1024;

// Install layout
const DEFAULT_INSTALL_ROOT: &str = ".";
const DEFAULT_LINK_NAME: &str = "bedrock-server";
const DEFAULT_BINARY_NAME: &str = "bedrock_server";
const DEFAULT_VERSION_FILE: &str = "version";

// Persistent data
const DEFAULT_DATA_ROOT: &str = "/data";
const DEFAULT_DATA_ENTRIES: [&str; 4] = [
    "worlds",
    "server.properties",
    "permissions.json",
    "whitelist.json",
];

// Upstream
const DEFAULT_PAGE_URL: &str = "https://www.minecraft.net/en-us/download/server/bedrock";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.33 (KHTML, like Gecko) Chrome/90.0.15.212 Safari/537.33";
const DEFAULT_DOWNLOAD_PATTERN: &str = r#"https?://[^"\s]+/bin-linux/bedrock-server-[^"\s]+\.zip"#;
const DEFAULT_VERSION_PATTERN: &str = r"bedrock-server-(.+)\.zip";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;
const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 3600;

// Shutdown
const DEFAULT_COUNTDOWN_STEPS: u32 = 6;
const DEFAULT_STEP_SECS: u64 = 5;
const DEFAULT_GRACE_SECS: u64 = 5;
const MAX_COUNTDOWN_STEPS: u32 = 60;
const MAX_STEP_SECS: u64 = 60;

// Daemon
const DEFAULT_HEARTBEAT_SECS: u64 = 60;

// Logging
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;
