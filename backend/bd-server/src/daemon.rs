//! Daemon mode: own the server until a shutdown request or a crash.

use crate::control::ControlState;
use crate::error::{Result as ServerErrorResult, ServerError};
use crate::{heartbeat, routes};

use bd_config::Config;
use bd_supervisor::{LockFile, RunOutcome, ShutdownTrigger, SignalCoordinator, Supervisor};

use std::process::ExitCode;
use std::time::Duration;

use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub async fn run(config: &Config) -> ServerErrorResult<ExitCode> {
    let lock = LockFile::acquire(&config.daemon.lock_path()?)?;

    let (trigger, requests) = ShutdownTrigger::channel();
    SignalCoordinator::spawn(trigger.clone())?;

    let supervisor = Supervisor::new(config)?;

    // Control interface
    let bind_addr = config.control.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::bind(bind_addr.clone(), e))?;
    match listener.local_addr() {
        Ok(addr) => info!("Control interface listening on {addr}"),
        Err(_) => info!("Control interface listening on {bind_addr}"),
    }

    let app = routes::build_router(ControlState::new(trigger, &config.shutdown));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let control = tokio::spawn(async move {
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await;

        if let Err(e) = served {
            error!("Control interface stopped: {e}");
        }
    });

    let heartbeat = heartbeat::spawn(
        supervisor.subscribe(),
        Duration::from_secs(config.daemon.heartbeat_secs),
    );

    let installed = supervisor.check_for_update().await;

    let outcome = tokio::task::spawn_blocking(move || supervisor.run(lock, installed, requests))
        .await
        .map_err(|e| ServerError::task(e.to_string()))?;

    if let Some(handle) = heartbeat {
        handle.abort();
    }
    let _ = stop_tx.send(());
    if let Err(e) = control.await {
        warn!("Control interface task ended abnormally: {e}");
    }

    match outcome? {
        RunOutcome::Stopped(request) => {
            info!("Bedrock server stopped ({request} shutdown)");
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::ServerExited(status) => {
            error!("Bedrock server is no longer running ({status})");
            Ok(ExitCode::FAILURE)
        }
    }
}
