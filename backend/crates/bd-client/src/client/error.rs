use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Error code the daemon answers with when a stop is already underway.
pub const ALREADY_STOPPING: &str = "ALREADY_STOPPING";

const NOT_IMPLEMENTED_STATUS: u16 = 501;

/// Errors that can occur talking to the control interface
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("Daemon error: {message} (HTTP {status}, code: {code}) {location}")]
    Api {
        status: u16,
        code: String,
        message: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    /// Convert reqwest error with context
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ClientError::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    /// Create an API error with location
    #[track_caller]
    pub fn api_error(status: u16, code: String, message: String) -> Self {
        ClientError::Api {
            status,
            code,
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// The daemon is already running a stop sequence.
    pub fn is_already_stopping(&self) -> bool {
        matches!(self, Self::Api { code, .. } if code == ALREADY_STOPPING)
    }

    /// The daemon does not implement the requested route.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == NOT_IMPLEMENTED_STATUS)
    }
}

impl From<reqwest::Error> for ClientError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        ClientError::from_reqwest(err)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
