use bd_supervisor::ControllerState;

use std::time::{Duration, Instant};

use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Periodic liveness line while the daemon runs. Zero disables it.
pub fn spawn(state: watch::Receiver<ControllerState>, interval: Duration) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }

    let started = Instant::now();

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let current = *state.borrow();
            info!("{}", heartbeat_line(current, started.elapsed()));
        }
    }))
}

pub fn heartbeat_line(state: ControllerState, uptime: Duration) -> String {
    let whole_secs = Duration::from_secs(uptime.as_secs());
    format!(
        "Still supervising: server {state}, up {}",
        humantime::format_duration(whole_secs)
    )
}
