pub(crate) mod client;
pub(crate) mod error;

pub use client::Client;
pub use error::{ALREADY_STOPPING, ClientError, Result as ControlClientResult};
