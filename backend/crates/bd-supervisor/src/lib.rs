//! Bedrock server supervision: version tracking, install activation, the
//! child process state machine, and the shutdown paths that drive it.

mod activation;
mod error;
mod fetcher;
mod lock;
mod process;
mod resolver;
mod server_version;
mod shutdown_request;
mod signals;
mod supervisor;
mod trigger;
mod upstream;

#[cfg(test)]
mod tests;

pub use activation::{ServerLayout, activate, reconcile_entry, repoint_link};
pub use error::{Result, SupervisorError};
pub use fetcher::{InstalledPath, UpdateFetcher};
pub use lock::{LockFile, LockInfo};
pub use process::{
    ControllerState, ManagedProcess, ProcessController, SERVER_LOG_TARGET, ShutdownTiming,
};
pub use resolver::VersionResolver;
pub use server_version::ServerVersion;
pub use shutdown_request::ShutdownRequest;
pub use signals::{HANDLED_SIGNALS, SignalAction, SignalCoordinator, translate};
pub use supervisor::{RunOutcome, Supervisor};
pub use trigger::{ShutdownTrigger, TriggerOutcome};
pub use upstream::{ArchiveLink, UpstreamClient};
