//! HTTP client for the daemon's local control interface.
//!
//! Used by the one-shot `--shutdown`, `--terminate` and `--healthcheck`
//! modes to reach a daemon that is already running.

pub(crate) mod client;

pub use client::{ALREADY_STOPPING, Client, ClientError, ControlClientResult};
