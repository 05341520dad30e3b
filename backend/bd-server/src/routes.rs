use crate::control::{
    ControlState, healthcheck_handler, message_handler, shutdown_handler, terminate_handler,
};

use axum::{Router, routing::get};

/// Build the control router; every route answers both GET and POST
pub fn build_router(state: ControlState) -> Router {
    Router::new()
        .route("/shutdown", get(shutdown_handler).post(shutdown_handler))
        .route("/terminate", get(terminate_handler).post(terminate_handler))
        .route(
            "/healthcheck",
            get(healthcheck_handler).post(healthcheck_handler),
        )
        .route("/message", get(message_handler).post(message_handler))
        .with_state(state)
}
