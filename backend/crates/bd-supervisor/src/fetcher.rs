//! Downloads and unpacks a server version.

use crate::{ArchiveLink, Result, ServerVersion, SupervisorError, UpstreamClient};

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use error_location::ErrorLocation;
use log::{info, warn};
use tokio::io::AsyncWriteExt;

const INSTALL_DIR_PREFIX: &str = "bedrock-server-";

/// A version unpacked to its own directory, ready to be activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPath {
    pub dir: PathBuf,
    pub version: ServerVersion,
}

pub struct UpdateFetcher {
    upstream: Arc<UpstreamClient>,
    install_root: PathBuf,
    version_file: String,
}

impl UpdateFetcher {
    pub fn new(upstream: Arc<UpstreamClient>, install_root: PathBuf, version_file: String) -> Self {
        Self {
            upstream,
            install_root,
            version_file,
        }
    }

    /// Directory a given version unpacks to.
    pub fn install_dir_for(&self, version: &ServerVersion) -> PathBuf {
        self.install_root
            .join(format!("{INSTALL_DIR_PREFIX}{}", version.as_str()))
    }

    /// Download the latest archive, unpack it and stamp the version marker.
    pub async fn download(&self) -> Result<InstalledPath> {
        info!("Gathering the latest version of the Bedrock server...");

        let link = self.upstream.resolve_archive().await?;
        info!("Downloading from: '{}'", link.url);

        std::fs::create_dir_all(&self.install_root)
            .map_err(|e| SupervisorError::io(&self.install_root, e))?;

        let archive_path = self.install_root.join(&link.file_name);
        if let Err(e) = self.stream_to_file(&link, &archive_path).await {
            std::fs::remove_file(&archive_path).ok();
            return Err(e);
        }

        let install_dir = self.install_dir_for(&link.version);
        let staging_dir = self
            .install_root
            .join(format!(".{INSTALL_DIR_PREFIX}{}.staging", link.version.as_str()));
        info!(
            "Unpacking {} to '{}'",
            link.file_name,
            install_dir.display()
        );

        let staged = self
            .stage(archive_path.clone(), &staging_dir, &link.version)
            .await
            .and_then(|()| Self::swap_into_place(&staging_dir, &install_dir));
        if let Err(e) = staged {
            std::fs::remove_file(&archive_path).ok();
            std::fs::remove_dir_all(&staging_dir).ok();
            return Err(e);
        }

        if let Err(e) = std::fs::remove_file(&archive_path) {
            warn!(
                "Failed to remove the downloaded archive '{}': {}",
                archive_path.display(),
                e
            );
        }

        info!(
            "Completed downloading Bedrock server version: {}",
            link.version
        );

        Ok(InstalledPath {
            dir: install_dir,
            version: link.version,
        })
    }

    async fn stream_to_file(&self, link: &ArchiveLink, path: &Path) -> Result<()> {
        let mut response = self.upstream.get(&link.url).await?;

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| SupervisorError::io(path, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SupervisorError::network(&link.url, e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| SupervisorError::io(path, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| SupervisorError::io(path, e))?;
        info!("Downloaded {} bytes to '{}'", written, path.display());

        Ok(())
    }

    /// Unpack into a fresh staging directory and stamp the version marker.
    async fn stage(
        &self,
        archive_path: PathBuf,
        staging_dir: &Path,
        version: &ServerVersion,
    ) -> Result<()> {
        remove_tree(staging_dir)?;
        Self::unpack(archive_path, staging_dir.to_path_buf()).await?;

        let marker = staging_dir.join(&self.version_file);
        std::fs::write(&marker, version.as_str()).map_err(|e| SupervisorError::io(&marker, e))
    }

    /// Replace any earlier copy of this version with the staged one.
    ///
    /// An earlier copy may already hold links into the data root; removing
    /// it unlinks them without touching their targets.
    fn swap_into_place(staging_dir: &Path, install_dir: &Path) -> Result<()> {
        if install_dir.symlink_metadata().is_ok() {
            warn!(
                "Replacing existing install directory '{}'",
                install_dir.display()
            );
            remove_tree(install_dir)?;
        }

        std::fs::rename(staging_dir, install_dir)
            .map_err(|e| SupervisorError::io(install_dir, e))
    }

    async fn unpack(archive_path: PathBuf, target: PathBuf) -> Result<()> {
        let task_path = archive_path.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let file = std::fs::File::open(&archive_path)
                .map_err(|e| SupervisorError::io(&archive_path, e))?;

            let mut archive =
                zip::ZipArchive::new(file).map_err(|source| SupervisorError::Archive {
                    path: archive_path.clone(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })?;

            archive
                .extract(&target)
                .map_err(|source| SupervisorError::Archive {
                    path: archive_path.clone(),
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })
        })
        .await
        .map_err(|e| SupervisorError::io(task_path, std::io::Error::other(e)))?
    }
}

/// Remove a directory tree, or a lone file or link, if present.
fn remove_tree(path: &Path) -> Result<()> {
    let removed = match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => std::fs::remove_dir_all(path),
        Ok(_) => std::fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };

    removed.map_err(|e| SupervisorError::io(path, e))
}
