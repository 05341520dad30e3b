use std::time::Duration;

use bd_config::ShutdownConfig;

/// Pacing of the stop sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTiming {
    /// Countdown broadcasts before the final warning
    pub countdown_steps: u32,
    /// Pause after each countdown broadcast
    pub step: Duration,
    /// Pause between the final warning and `stop`
    pub grace: Duration,
}

impl ShutdownTiming {
    /// Seconds announced by the countdown broadcast at `remaining` steps.
    pub fn announced_secs(&self, remaining: u32) -> u64 {
        (self.step * remaining).as_secs()
    }
}

impl Default for ShutdownTiming {
    fn default() -> Self {
        Self::from(&ShutdownConfig::default())
    }
}

impl From<&ShutdownConfig> for ShutdownTiming {
    fn from(config: &ShutdownConfig) -> Self {
        Self {
            countdown_steps: config.countdown_steps,
            step: Duration::from_secs(config.step_secs),
            grace: Duration::from_secs(config.grace_secs),
        }
    }
}
