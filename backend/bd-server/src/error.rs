use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] bd_config::ConfigError),

    #[error("{0}")]
    Supervisor(#[from] bd_supervisor::SupervisorError),

    #[error("Failed to bind control interface on {addr}: {source} {location}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Logger error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    #[error("Supervisor task failed: {message} {location}")]
    Task {
        message: String,
        location: ErrorLocation,
    },
}

impl ServerError {
    #[track_caller]
    pub fn bind(addr: String, source: std::io::Error) -> Self {
        Self::Bind {
            addr,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn logger<S: Into<String>>(message: S) -> Self {
        Self::Logger {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn task<S: Into<String>>(message: S) -> Self {
        Self::Task {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config(_) => "Fix config.toml or the BD_* environment variables.",
            Self::Supervisor(e) => e.recovery_hint(),
            Self::Bind { .. } => {
                "Another process holds the control port. \
                   Stop it or set control.port / BD_CONTROL_PORT."
            }
            Self::Logger { .. } => "Check logging.dir and logging.file permissions.",
            Self::Task { .. } => "The supervisor thread crashed. Check the log above for a panic.",
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
