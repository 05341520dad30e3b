//! Installed vs. latest available server version.

use crate::{Result, ServerVersion, SupervisorError, UpstreamClient};

use std::path::PathBuf;
use std::sync::Arc;

use log::info;

const NOT_INSTALLED: &str = "Not Installed";

pub struct VersionResolver {
    upstream: Arc<UpstreamClient>,
    marker_path: PathBuf,
}

impl VersionResolver {
    /// # Arguments
    /// * `upstream` - Shared vendor page client
    /// * `marker_path` - Version marker as seen through the stable link
    pub fn new(upstream: Arc<UpstreamClient>, marker_path: PathBuf) -> Self {
        Self {
            upstream,
            marker_path,
        }
    }

    /// Read the installed version marker; a missing marker means "not installed".
    pub fn current_version(&self) -> Result<Option<ServerVersion>> {
        match std::fs::read_to_string(&self.marker_path) {
            Ok(contents) => Ok(Some(ServerVersion::new(contents.trim()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SupervisorError::io(&self.marker_path, e)),
        }
    }

    /// Scrape the vendor page for the latest version token.
    pub async fn latest_version(&self) -> Result<ServerVersion> {
        Ok(self.upstream.resolve_archive().await?.version)
    }

    /// True iff nothing is installed or the installed version differs from the latest.
    pub async fn update_available(&self) -> Result<bool> {
        let current = self.current_version()?;
        info!(
            "Local version: {}",
            current
                .as_ref()
                .map(ServerVersion::as_str)
                .unwrap_or(NOT_INSTALLED)
        );

        let latest = self.latest_version().await?;
        info!("Online version: {}", latest);

        Ok(Self::differs(current.as_ref(), &latest))
    }

    /// Case-sensitive token comparison.
    pub fn differs(current: Option<&ServerVersion>, latest: &ServerVersion) -> bool {
        current != Some(latest)
    }
}
