//! Single delivery point for shutdown requests.

use crate::ShutdownRequest;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use log::{info, warn};

/// Result of asking for a shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// This request will drive the stop sequence
    Accepted,
    /// An earlier request already did; this one is dropped
    AlreadyStopping,
}

/// Cloneable handle shared by every request source.
///
/// Only the first request is ever delivered to the supervisor; later ones
/// are answered with [`TriggerOutcome::AlreadyStopping`].
#[derive(Clone)]
pub struct ShutdownTrigger {
    tx: mpsc::Sender<ShutdownRequest>,
    requested: Arc<AtomicBool>,
}

impl ShutdownTrigger {
    /// Create a trigger and the receiving end the supervisor waits on.
    pub fn channel() -> (Self, mpsc::Receiver<ShutdownRequest>) {
        let (tx, rx) = mpsc::channel();

        (
            Self {
                tx,
                requested: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Request a shutdown on behalf of `source` (used in logs only).
    pub fn request(&self, request: ShutdownRequest, source: &str) -> TriggerOutcome {
        if self.requested.swap(true, Ordering::SeqCst) {
            info!("Ignoring {request} shutdown from {source}: already stopping");
            return TriggerOutcome::AlreadyStopping;
        }

        info!("{source} requested {request} shutdown");

        if self.tx.send(request).is_err() {
            warn!("Supervisor is no longer waiting for shutdown requests");
        }

        TriggerOutcome::Accepted
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
