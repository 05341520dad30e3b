use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_COUNTDOWN_STEPS, DEFAULT_GRACE_SECS,
    DEFAULT_STEP_SECS, MAX_COUNTDOWN_STEPS, MAX_STEP_SECS,
};

use serde::Deserialize;

/// Graceful shutdown countdown: `countdown_steps` warnings, `step_secs` apart,
/// followed by a final warning and `grace_secs` before `stop` is sent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub countdown_steps: u32,
    pub step_secs: u64,
    pub grace_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            countdown_steps: DEFAULT_COUNTDOWN_STEPS,
            step_secs: DEFAULT_STEP_SECS,
            grace_secs: DEFAULT_GRACE_SECS,
        }
    }
}

impl ShutdownConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.countdown_steps == 0 || self.countdown_steps > MAX_COUNTDOWN_STEPS {
            return Err(ConfigError::shutdown(format!(
                "shutdown.countdown_steps must be 1-{}, got {}",
                MAX_COUNTDOWN_STEPS, self.countdown_steps
            )));
        }

        if self.step_secs == 0 || self.step_secs > MAX_STEP_SECS {
            return Err(ConfigError::shutdown(format!(
                "shutdown.step_secs must be 1-{}, got {}",
                MAX_STEP_SECS, self.step_secs
            )));
        }

        if self.grace_secs > MAX_STEP_SECS {
            return Err(ConfigError::shutdown(format!(
                "shutdown.grace_secs must be 0-{}, got {}",
                MAX_STEP_SECS, self.grace_secs
            )));
        }

        Ok(())
    }

    /// Total countdown announced to players, in seconds.
    pub fn countdown_total_secs(&self) -> u64 {
        u64::from(self.countdown_steps) * self.step_secs
    }
}
