use crate::{
    ConfigError, ConfigErrorResult, DEFAULT_DOWNLOAD_PATTERN, DEFAULT_PAGE_URL,
    DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_VERSION_PATTERN,
    MAX_UPSTREAM_TIMEOUT_SECS,
};

use regex::Regex;
use serde::Deserialize;

/// Vendor download page and the patterns used to scrape it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub page_url: String,
    /// The vendor rejects requests carrying a non-browser user agent.
    pub user_agent: String,
    /// Matches the platform archive URL inside the page HTML
    pub download_pattern: String,
    /// Captures the version token (group 1) from the archive file name
    pub version_pattern: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            page_url: String::from(DEFAULT_PAGE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
            download_pattern: String::from(DEFAULT_DOWNLOAD_PATTERN),
            version_pattern: String::from(DEFAULT_VERSION_PATTERN),
            timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
        }
    }
}

impl UpstreamConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !self.page_url.starts_with("http://") && !self.page_url.starts_with("https://") {
            return Err(ConfigError::upstream(format!(
                "upstream.page_url must be an http(s) URL, got {}",
                self.page_url
            )));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_UPSTREAM_TIMEOUT_SECS {
            return Err(ConfigError::upstream(format!(
                "upstream.timeout_secs must be 1-{}, got {}",
                MAX_UPSTREAM_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        self.download_regex()?;

        let version = self.version_regex()?;
        if version.captures_len() < 2 {
            return Err(ConfigError::upstream(
                "upstream.version_pattern must contain a capture group for the version",
            ));
        }

        Ok(())
    }

    pub fn download_regex(&self) -> ConfigErrorResult<Regex> {
        Regex::new(&self.download_pattern).map_err(|source| ConfigError::Pattern {
            field: "upstream.download_pattern",
            pattern: self.download_pattern.clone(),
            source,
        })
    }

    pub fn version_regex(&self) -> ConfigErrorResult<Regex> {
        Regex::new(&self.version_pattern).map_err(|source| ConfigError::Pattern {
            field: "upstream.version_pattern",
            pattern: self.version_pattern.clone(),
            source,
        })
    }
}
