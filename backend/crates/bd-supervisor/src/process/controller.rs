//! Start/stop state machine for the managed server.

use crate::activation;
use crate::process::{ControllerState, ManagedProcess, ShutdownTiming};
use crate::{InstalledPath, Result, ServerLayout, ShutdownRequest, SupervisorError};

use std::process::ExitStatus;

use log::{info, warn};
use tokio::sync::watch;

const FINAL_WARNING: &str = "shutting down NOW...";
const STOP_COMMAND: &str = "stop";

/// Owns the one server child and drives it through its lifecycle.
///
/// All operations take `&mut self`; whoever owns the controller is the only
/// party able to start or stop the server. Stop sequences block the calling
/// thread, so the controller lives on a blocking thread.
pub struct ProcessController {
    layout: ServerLayout,
    timing: ShutdownTiming,
    process: Option<ManagedProcess>,
    state_tx: watch::Sender<ControllerState>,
    state_rx: watch::Receiver<ControllerState>,
}

impl ProcessController {
    pub fn new(layout: ServerLayout, timing: ShutdownTiming) -> Self {
        let (state_tx, state_rx) = watch::channel(ControllerState::Uninitialized);

        Self {
            layout,
            timing,
            process: None,
            state_tx,
            state_rx,
        }
    }

    /// Switch to a newly installed version, if any.
    pub fn activate(&mut self, installed: Option<&InstalledPath>) -> Result<()> {
        self.set_state(ControllerState::Activating);

        match installed {
            Some(installed) => activation::activate(&self.layout, installed),
            None => {
                info!(
                    "No new version to activate, using '{}'",
                    self.layout.link_path.display()
                );
                Ok(())
            }
        }
    }

    /// Spawn the server from the active install.
    pub fn launch(&mut self) -> Result<u32> {
        if let Some(ref process) = self.process {
            return Err(SupervisorError::process(
                format!("server already running (pid {})", process.pid()),
                None,
            ));
        }

        info!("Starting Bedrock server...");
        let process = ManagedProcess::spawn(&self.layout)?;
        let pid = process.pid();
        self.process = Some(process);

        self.set_state(ControllerState::Running { pid });
        info!("Started Bedrock server (pid {pid})");

        Ok(pid)
    }

    /// Write a console command to the server.
    pub fn send_command(&mut self, text: &str) -> Result<()> {
        let process = self
            .process
            .as_mut()
            .ok_or_else(|| SupervisorError::process("no server running", None))?;

        process.send_line(text)
    }

    pub fn stop(&mut self, request: ShutdownRequest) -> Result<()> {
        match request {
            ShutdownRequest::Graceful => self.graceful_stop(),
            ShutdownRequest::Immediate => self.immediate_stop(),
        }
    }

    /// Count down in-game, then stop.
    pub fn graceful_stop(&mut self) -> Result<()> {
        if self.process.is_none() {
            return self.stop_without_process(ShutdownRequest::Graceful);
        }

        self.set_state(ControllerState::Stopping);

        for remaining in (1..=self.timing.countdown_steps).rev() {
            let secs = self.timing.announced_secs(remaining);
            self.broadcast(&format!("shutting down in {secs} seconds..."));
            std::thread::sleep(self.timing.step);
        }

        self.finish_stop()
    }

    /// Final warning, short grace, stop.
    pub fn immediate_stop(&mut self) -> Result<()> {
        if self.process.is_none() {
            return self.stop_without_process(ShutdownRequest::Immediate);
        }

        self.set_state(ControllerState::Stopping);
        self.finish_stop()
    }

    /// Report an exit the server made on its own.
    pub fn poll_exit(&mut self) -> Result<Option<ExitStatus>> {
        let Some(process) = self.process.as_mut() else {
            return Ok(None);
        };

        let Some(status) = process.try_wait()? else {
            return Ok(None);
        };

        process.wait()?;
        self.process = None;
        self.set_state(ControllerState::Stopped);

        Ok(Some(status))
    }

    fn finish_stop(&mut self) -> Result<()> {
        self.broadcast(FINAL_WARNING);
        std::thread::sleep(self.timing.grace);

        if let Err(e) = self.send_command(STOP_COMMAND) {
            warn!("Could not send '{STOP_COMMAND}' to the server: {e}");
        }

        let status = match self.process.as_mut() {
            Some(process) => process.wait()?,
            None => return self.stop_without_process(ShutdownRequest::Immediate),
        };

        self.process = None;
        self.set_state(ControllerState::Stopped);
        info!("Stopped Bedrock server ({status})");

        Ok(())
    }

    fn stop_without_process(&mut self, request: ShutdownRequest) -> Result<()> {
        info!("{request} stop requested but no server is running");
        self.set_state(ControllerState::Stopped);
        Ok(())
    }

    /// `say` a message to players; delivery failures are logged only.
    fn broadcast(&mut self, message: &str) {
        info!("{message}");
        if let Err(e) = self.send_command(&format!("say {message}")) {
            warn!("Broadcast failed: {e}");
        }
    }

    fn set_state(&self, state: ControllerState) {
        let _ = self.state_tx.send(state);
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_rx.clone()
    }

    pub fn state(&self) -> ControllerState {
        *self.state_rx.borrow()
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().map(ManagedProcess::pid)
    }

    pub fn layout(&self) -> &ServerLayout {
        &self.layout
    }
}
