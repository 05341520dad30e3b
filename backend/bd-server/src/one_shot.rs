//! Client modes: forward a single request to a running daemon and exit.

use crate::cli::ControlAction;

use bd_client::{Client, ControlClientResult};

use std::process::ExitCode;

use log::{error, info, warn};
use serde_json::Value;

pub async fn run(action: ControlAction, server_url: &str) -> ExitCode {
    let client = Client::new(server_url);
    info!("Sending {action} request to {}", client.base_url);

    let result = match action {
        ControlAction::Shutdown => client.shutdown().await,
        ControlAction::Terminate => client.terminate().await,
        ControlAction::Healthcheck => client.healthcheck().await,
    };

    report(action, &result);

    if succeeded(action, &result) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// A completed exchange counts as success, including "already stopping"
/// and an unimplemented health check.
pub fn succeeded(action: ControlAction, result: &ControlClientResult<Value>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.is_already_stopping() => true,
        Err(e) => action == ControlAction::Healthcheck && e.is_not_implemented(),
    }
}

fn report(action: ControlAction, result: &ControlClientResult<Value>) {
    match result {
        Ok(body) => {
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("accepted");
            info!("{action}: {message}");
        }
        Err(e) if e.is_already_stopping() => {
            info!("{action}: the daemon is already shutting down");
        }
        Err(e) if e.is_not_implemented() => {
            warn!("{action}: not supported by the daemon ({e})");
        }
        Err(e) => error!("{action} failed: {e}"),
    }
}
