use std::fmt;

/// Lifecycle of the managed server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing has happened yet
    Uninitialized,
    /// Switching the install link and wiring data
    Activating,
    /// Child process is up
    Running { pid: u32 },
    /// A stop sequence is in progress
    Stopping,
    /// Child has exited (or was never started)
    Stopped,
}

impl ControllerState {
    /// Whether a child process handle exists in this state.
    pub fn has_process(&self) -> bool {
        matches!(self, Self::Running { .. } | Self::Stopping)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Activating => write!(f, "activating"),
            Self::Running { pid } => write!(f, "running (pid {pid})"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
