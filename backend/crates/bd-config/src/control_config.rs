use crate::{ConfigError, ConfigErrorResult, DEFAULT_CONTROL_HOST, DEFAULT_CONTROL_PORT, MIN_PORT};

use std::net::IpAddr;

use serde::Deserialize;

/// Local HTTP control interface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_CONTROL_HOST),
            port: DEFAULT_CONTROL_PORT,
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.port < MIN_PORT {
            return Err(ConfigError::control(format!(
                "control.port must be >= {}, got {}",
                MIN_PORT, self.port
            )));
        }

        // The control surface has no auth, so it must never listen off-host.
        let is_loopback = self.host == "localhost"
            || self
                .host
                .parse::<IpAddr>()
                .map(|ip| ip.is_loopback())
                .unwrap_or(false);

        if !is_loopback {
            return Err(ConfigError::control(format!(
                "control.host must be a loopback address, got {}",
                self.host
            )));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL used by the one-shot client modes.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
