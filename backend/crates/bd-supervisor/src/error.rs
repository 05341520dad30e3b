use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Network failure fetching {url}: {source} {location}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("Upstream returned HTTP {status} for {url} {location}")]
    UpstreamStatus {
        url: String,
        status: u16,
        location: ErrorLocation,
    },

    #[error("Failed to parse upstream content: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO failure at {path}: {source} {location}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to unpack archive {path}: {source} {location}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
        location: ErrorLocation,
    },

    #[error("Server process failure: {message} {location}")]
    Process {
        message: String,
        #[source]
        source: Option<std::io::Error>,
        location: ErrorLocation,
    },

    #[error("Another daemon is already running (lock file: {path}, pid {pid}) {location}")]
    AlreadyRunning {
        path: PathBuf,
        pid: u32,
        location: ErrorLocation,
    },

    #[error("Failed to acquire lock at {path}: {source} {location}")]
    LockAcquisition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: bd_config::ConfigError,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process<S: Into<String>>(message: S, source: Option<std::io::Error>) -> Self {
        Self::Process {
            message: message.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this failure came from talking to the vendor
    /// (and so only costs us freshness, never availability).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::UpstreamStatus { .. } | Self::Parse { .. }
        )
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::AlreadyRunning { .. } => {
                "Another daemon instance holds the lock. \
                   Stop it first, or remove the lock file if that process is gone."
            }
            Self::LockAcquisition { .. } => {
                "Unable to create the lock file. \
                   Check permissions on the directory next to the executable."
            }
            Self::Process { .. } => {
                "The server binary could not be started or stopped. \
                   Check that the install directory is complete and executable."
            }
            Self::Io { .. } => {
                "A filesystem operation failed. \
                   Check permissions on the install and data directories."
            }
            Self::Parse { .. } | Self::UpstreamStatus { .. } => {
                "The vendor download page changed or is unavailable. \
                   Update the upstream patterns in config.toml."
            }
            Self::Network { .. } => "The vendor download page is unreachable. Check connectivity.",
            Self::Archive { .. } => {
                "The downloaded archive is corrupt. It will be fetched again on next start."
            }
            Self::Config { .. } => "Fix config.toml or the BD_* environment variables.",
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
