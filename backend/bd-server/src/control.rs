//! Control interface handlers.
//!
//! `/shutdown` and `/terminate` only hand a request to the shutdown trigger
//! and answer right away; the stop sequence itself runs on the supervisor
//! thread.

use std::panic::Location;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bd_config::ShutdownConfig;
use bd_supervisor::{ShutdownRequest, ShutdownTrigger, TriggerOutcome};
use error_location::ErrorLocation;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONTROL_SOURCE: &str = "control interface";

#[derive(Clone)]
pub struct ControlState {
    trigger: ShutdownTrigger,
    countdown_secs: u64,
}

impl ControlState {
    pub fn new(trigger: ShutdownTrigger, shutdown: &ShutdownConfig) -> Self {
        Self {
            trigger,
            countdown_secs: shutdown.countdown_total_secs(),
        }
    }
}

/// Body of an accepted shutdown request
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: String,
    pub request: String,
    pub message: String,
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlErrorResponse {
    pub error: ControlErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlErrorBody {
    /// Machine-readable error code (e.g., "ALREADY_STOPPING")
    pub code: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ControlError {
    /// A stop sequence is already running (409)
    #[error("Shutdown already in progress {location}")]
    AlreadyStopping { location: ErrorLocation },

    /// Route exists but has no behaviour yet (501)
    #[error("{route} is not implemented {location}")]
    NotImplemented {
        route: &'static str,
        location: ErrorLocation,
    },
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        info!("{}", self);

        let (status, body) = match self {
            ControlError::AlreadyStopping { .. } => (
                StatusCode::CONFLICT,
                ControlErrorBody {
                    code: bd_client::ALREADY_STOPPING.into(),
                    message: "A shutdown is already in progress".into(),
                },
            ),
            ControlError::NotImplemented { route, .. } => (
                StatusCode::NOT_IMPLEMENTED,
                ControlErrorBody {
                    code: "NOT_IMPLEMENTED".into(),
                    message: format!("{route} is not implemented"),
                },
            ),
        };

        (status, Json(ControlErrorResponse { error: body })).into_response()
    }
}

fn request_stop(
    state: &ControlState,
    request: ShutdownRequest,
    message: String,
) -> Result<(StatusCode, Json<ControlResponse>), ControlError> {
    match state.trigger.request(request, CONTROL_SOURCE) {
        TriggerOutcome::Accepted => Ok((
            StatusCode::ACCEPTED,
            Json(ControlResponse {
                status: "accepted".to_string(),
                request: request.to_string(),
                message,
            }),
        )),
        TriggerOutcome::AlreadyStopping => Err(ControlError::AlreadyStopping {
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Graceful shutdown: countdown broadcast to players, then stop.
pub async fn shutdown_handler(
    State(state): State<ControlState>,
) -> Result<(StatusCode, Json<ControlResponse>), ControlError> {
    let message = format!("Server will shut down in {} seconds", state.countdown_secs);
    request_stop(&state, ShutdownRequest::Graceful, message)
}

/// Immediate shutdown: single warning, then stop.
pub async fn terminate_handler(
    State(state): State<ControlState>,
) -> Result<(StatusCode, Json<ControlResponse>), ControlError> {
    request_stop(
        &state,
        ShutdownRequest::Immediate,
        "Server is shutting down now".to_string(),
    )
}

pub async fn healthcheck_handler() -> ControlError {
    ControlError::NotImplemented {
        route: "/healthcheck",
        location: ErrorLocation::from(Location::caller()),
    }
}

pub async fn message_handler() -> ControlError {
    ControlError::NotImplemented {
        route: "/message",
        location: ErrorLocation::from(Location::caller()),
    }
}
