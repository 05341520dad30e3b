pub mod cli;
pub mod control;
pub mod daemon;
pub mod error;
pub mod heartbeat;
pub mod logger;
pub mod one_shot;
pub mod routes;

#[cfg(test)]
mod tests;

pub use crate::cli::{Cli, ControlAction};
pub use crate::control::{
    ControlError, ControlErrorBody, ControlErrorResponse, ControlResponse, ControlState,
};
pub use crate::error::{Result as ServerErrorResult, ServerError};
pub use crate::routes::build_router;
