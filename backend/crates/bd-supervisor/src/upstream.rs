//! Vendor download page access.
//!
//! The vendor rejects requests that carry reqwest's default headers, and a
//! redirect hop that drops them fails the same way. All required headers are
//! installed as client defaults so every hop (including redirects) sends them.

use crate::{Result, ServerVersion, SupervisorError};

use std::panic::Location;
use std::time::Duration;

use bd_config::UpstreamConfig;
use error_location::ErrorLocation;
use log::debug;
use regex::Regex;
use reqwest::header::{
    ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue, USER_AGENT,
};
use reqwest::redirect::Policy;

const MAX_REDIRECTS: usize = 10;

/// A platform archive advertised on the download page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLink {
    pub url: String,
    pub file_name: String,
    pub version: ServerVersion,
}

pub struct UpstreamClient {
    client: reqwest::Client,
    page_url: String,
    page_timeout: Duration,
    download_regex: Regex,
    version_regex: Regex,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| SupervisorError::parse(format!("Invalid user agent: {e}")))?,
        );

        // No total deadline on the client: archive downloads stream for
        // minutes. Only the page fetch carries one.
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| SupervisorError::network(&config.page_url, e))?;

        Ok(Self {
            client,
            page_url: config.page_url.clone(),
            page_timeout: timeout,
            download_regex: config.download_regex()?,
            version_regex: config.version_regex()?,
        })
    }

    /// GET a URL and fail on any non-success status.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        Self::send(self.client.get(url), url).await
    }

    async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| SupervisorError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SupervisorError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!("GET {} -> {} ({})", url, status, response.url());
        Ok(response)
    }

    /// Fetch the download page HTML.
    pub async fn fetch_page(&self) -> Result<String> {
        let request = self.client.get(&self.page_url).timeout(self.page_timeout);
        let response = Self::send(request, &self.page_url).await?;
        response
            .text()
            .await
            .map_err(|e| SupervisorError::network(&self.page_url, e))
    }

    /// Fetch the download page and locate the platform archive on it.
    pub async fn resolve_archive(&self) -> Result<ArchiveLink> {
        let html = self.fetch_page().await?;
        self.parse_archive_link(&html)
    }

    /// Extract the archive URL, then the version token from its file name.
    pub fn parse_archive_link(&self, html: &str) -> Result<ArchiveLink> {
        let url = self
            .download_regex
            .find(html)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                SupervisorError::parse(format!(
                    "no download link matching '{}' on {}",
                    self.download_regex.as_str(),
                    self.page_url
                ))
            })?;

        let file_name = reqwest::Url::parse(&url)
            .ok()
            .and_then(|u| u.path_segments()?.next_back().map(String::from))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| SupervisorError::parse(format!("no file name in download link {url}")))?;

        let version = self
            .version_regex
            .captures(&file_name)
            .and_then(|c| c.get(1))
            .map(|m| ServerVersion::new(m.as_str()))
            .ok_or_else(|| {
                SupervisorError::parse(format!(
                    "no version matching '{}' in {}",
                    self.version_regex.as_str(),
                    file_name
                ))
            })?;

        Ok(ArchiveLink {
            url,
            file_name,
            version,
        })
    }
}
