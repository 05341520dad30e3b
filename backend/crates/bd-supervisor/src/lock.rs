//! Lock file for single-instance enforcement.

use crate::{Result, SupervisorError};

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use log::info;
use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};

const LOCK_FILE_MODE: u32 = 0o644;

/// Marks a running daemon on disk.
///
/// The lock file contains JSON with the PID and start time, so a lock left
/// behind by a crashed daemon can be recognised and replaced.
pub struct LockFile {
    path: PathBuf,
    file: Option<File>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub started_at: String,
}

impl LockFile {
    /// Try to acquire the lock file.
    ///
    /// Fails with `AlreadyRunning` if the recorded process is alive. A lock
    /// whose process is gone, or whose body is unreadable, is replaced.
    #[track_caller]
    pub fn acquire(path: &Path) -> Result<Self> {
        let caller = Location::caller();

        if path.exists() {
            match Self::read_lock_info(path) {
                Ok(existing) if Self::is_process_running(existing.pid) => {
                    return Err(SupervisorError::AlreadyRunning {
                        path: path.to_path_buf(),
                        pid: existing.pid,
                        location: ErrorLocation::from(caller),
                    });
                }
                Ok(existing) => {
                    info!(
                        "Removing stale lock file (PID {} not running)",
                        existing.pid
                    );
                }
                Err(e) => {
                    info!("Replacing unreadable lock file {}: {}", path.display(), e);
                }
            }
            std::fs::remove_file(path).ok();
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(LOCK_FILE_MODE)
            .open(path)
            .map_err(|e| SupervisorError::LockAcquisition {
                path: path.to_path_buf(),
                source: e,
                location: ErrorLocation::from(caller),
            })?;

        let mut lock = Self {
            path: path.to_path_buf(),
            file: Some(file),
        };

        lock.write_info()?;
        info!("Acquired lock file {}", lock.path.display());

        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write current process info to lock file.
    fn write_info(&mut self) -> Result<()> {
        let info = LockInfo {
            pid: std::process::id(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        let content = serde_json::to_string_pretty(&info)
            .map_err(|e| SupervisorError::io(&self.path, std::io::Error::other(e)))?;

        if let Some(ref mut file) = self.file {
            file.write_all(content.as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(|e| SupervisorError::LockAcquisition {
                    path: self.path.clone(),
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }

        Ok(())
    }

    /// Read lock info from existing file.
    pub fn read_lock_info(path: &Path) -> std::result::Result<LockInfo, std::io::Error> {
        let mut file = File::open(path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Check if a process with given PID is running.
    fn is_process_running(pid: u32) -> bool {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        if raw <= 0 {
            return false;
        }
        // Signal 0 only probes for existence; EPERM means it exists
        matches!(kill(Pid::from_raw(raw), None), Ok(()) | Err(Errno::EPERM))
    }

    /// Release the lock file.
    ///
    /// Called automatically on drop, but can be called
    /// explicitly for graceful shutdown.
    pub fn release(&mut self) {
        if self.file.take().is_some() {
            std::fs::remove_file(&self.path).ok();
            info!("Released lock file {}", self.path.display());
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        self.release();
    }
}
