//! OS signal subscription.

use crate::{Result, ShutdownRequest, ShutdownTrigger, SupervisorError, TriggerOutcome};

use std::thread::JoinHandle;

use log::{error, info};
use signal_hook::consts::{SIGINT, SIGIO, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;

/// Signals the coordinator subscribes to.
pub const HANDLED_SIGNALS: [i32; 4] = [SIGINT, SIGTERM, SIGQUIT, SIGIO];

/// What a received signal means to the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown(ShutdownRequest),
    /// Acknowledged in the log, otherwise ignored
    LogOnly,
}

/// Quit counts down, interrupt and terminate stop right away, IO
/// readiness (SIGPOLL) is only noted.
pub fn translate(signal: i32) -> Option<SignalAction> {
    match signal {
        SIGQUIT => Some(SignalAction::Shutdown(ShutdownRequest::Graceful)),
        SIGINT | SIGTERM => Some(SignalAction::Shutdown(ShutdownRequest::Immediate)),
        SIGIO => Some(SignalAction::LogOnly),
        _ => None,
    }
}

pub struct SignalCoordinator;

impl SignalCoordinator {
    /// Register handlers and forward translated signals from a dedicated thread.
    pub fn spawn(trigger: ShutdownTrigger) -> Result<JoinHandle<()>> {
        let mut signals = Signals::new(HANDLED_SIGNALS).map_err(|e| {
            SupervisorError::process("failed to register signal handlers", Some(e))
        })?;

        std::thread::Builder::new()
            .name("signal-coordinator".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    Self::dispatch(&trigger, signal);
                }
            })
            .map_err(|e| SupervisorError::process("failed to start signal thread", Some(e)))
    }

    /// Handle one delivered signal.
    pub fn dispatch(trigger: &ShutdownTrigger, signal: i32) -> Option<TriggerOutcome> {
        match translate(signal) {
            Some(SignalAction::Shutdown(request)) => {
                info!("Received signal {signal}");
                Some(trigger.request(request, &format!("signal {signal}")))
            }
            Some(SignalAction::LogOnly) => {
                info!("Poll signal received");
                None
            }
            None => {
                error!("Received unexpected signal {signal}");
                None
            }
        }
    }
}
