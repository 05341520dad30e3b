//! Daemon lifecycle: update check, activation, launch, wait, stop.

use crate::{
    ControllerState, InstalledPath, LockFile, ProcessController, Result, ServerLayout,
    ShutdownRequest, ShutdownTiming, UpdateFetcher, UpstreamClient, VersionResolver,
};

use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use bd_config::Config;
use log::{error, info, warn};
use tokio::sync::watch;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How a supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A shutdown request stopped the server
    Stopped(ShutdownRequest),
    /// The server exited without being asked to
    ServerExited(ExitStatus),
}

pub struct Supervisor {
    resolver: VersionResolver,
    fetcher: UpdateFetcher,
    controller: ProcessController,
}

impl Supervisor {
    pub fn new(config: &Config) -> Result<Self> {
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);

        Ok(Self::with_parts(
            VersionResolver::new(upstream.clone(), config.install.version_marker_path()),
            UpdateFetcher::new(
                upstream,
                config.install.root_path(),
                config.install.version_file.clone(),
            ),
            ProcessController::new(
                ServerLayout::from_config(config),
                ShutdownTiming::from(&config.shutdown),
            ),
        ))
    }

    pub fn with_parts(
        resolver: VersionResolver,
        fetcher: UpdateFetcher,
        controller: ProcessController,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            controller,
        }
    }

    /// Subscribe to controller state changes.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.controller.subscribe()
    }

    /// Download a new version if upstream has one.
    ///
    /// Never fails: a broken update check only costs freshness, so every
    /// error is logged and treated as "no update".
    pub async fn check_for_update(&self) -> Option<InstalledPath> {
        info!("Checking for Bedrock server updates...");

        let available = match self.resolver.update_available().await {
            Ok(available) => available,
            Err(e) => {
                error!("Failed to gather Bedrock server versions: {e}");
                return None;
            }
        };

        info!("Update available: {available}");
        if !available {
            return None;
        }

        match self.fetcher.download().await {
            Ok(installed) => Some(installed),
            Err(e) => {
                error!("Failed to download the latest Bedrock server: {e}");
                None
            }
        }
    }

    /// Drive the server until a shutdown request arrives or it exits.
    ///
    /// Blocks the calling thread. The lock is released before returning on
    /// every path, errors included.
    pub fn run(
        mut self,
        mut lock: LockFile,
        installed: Option<InstalledPath>,
        requests: Receiver<ShutdownRequest>,
    ) -> Result<RunOutcome> {
        self.controller.activate(installed.as_ref())?;

        if let Ok(request) = requests.try_recv() {
            info!("{request} shutdown requested before launch, not starting the server");
            self.controller.stop(request)?;
            lock.release();
            return Ok(RunOutcome::Stopped(request));
        }

        self.controller.launch()?;

        let outcome = loop {
            match requests.recv_timeout(EXIT_POLL_INTERVAL) {
                Ok(request) => {
                    self.controller.stop(request)?;
                    break RunOutcome::Stopped(request);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(status) = self.controller.poll_exit()? {
                        error!("Bedrock server exited unexpectedly ({status})");
                        break RunOutcome::ServerExited(status);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("No shutdown request sources remain, stopping immediately");
                    self.controller.stop(ShutdownRequest::Immediate)?;
                    break RunOutcome::Stopped(ShutdownRequest::Immediate);
                }
            }
        };

        lock.release();
        Ok(outcome)
    }
}
