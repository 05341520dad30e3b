
use crate::build_router;
use crate::control::ControlState;

use bd_config::ShutdownConfig;
use bd_supervisor::{ShutdownRequest, ShutdownTrigger};

use std::sync::mpsc::Receiver;

use axum_test::TestServer;

/// Control router over a fresh trigger, plus the receiver the supervisor would own.
pub(crate) fn control_server() -> (TestServer, ShutdownTrigger, Receiver<ShutdownRequest>) {
    let (trigger, requests) = ShutdownTrigger::channel();
    let state = ControlState::new(trigger.clone(), &ShutdownConfig::default());

    let server = TestServer::builder()
        .http_transport()
        .build(build_router(state))
        .expect("Failed to create test server");

    (server, trigger, requests)
}
