mod controller;
mod controller_state;
mod managed_process;
mod shutdown_timing;

pub use controller::ProcessController;
pub use controller_state::ControllerState;
pub use managed_process::{ManagedProcess, SERVER_LOG_TARGET};
pub use shutdown_timing::ShutdownTiming;
