//! Switching the stable server link to a freshly unpacked version and
//! wiring persistent data into it.

use crate::{InstalledPath, Result, SupervisorError};

use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::{Path, PathBuf};

use bd_config::Config;
use log::{debug, info, warn};

const BINARY_MODE: u32 = 0o755;

/// Filesystem layout the controller works against.
#[derive(Debug, Clone)]
pub struct ServerLayout {
    pub install_root: PathBuf,
    pub link_path: PathBuf,
    pub binary: String,
    pub data_root: PathBuf,
    pub data_entries: Vec<String>,
}

impl ServerLayout {
    pub fn from_config(config: &Config) -> Self {
        Self {
            install_root: config.install.root_path(),
            link_path: config.install.link_path(),
            binary: config.install.binary.clone(),
            data_root: config.data.root_path(),
            data_entries: config.data.entries.clone(),
        }
    }

    /// Server executable as seen through the stable link.
    pub fn binary_path(&self) -> PathBuf {
        self.link_path.join(&self.binary)
    }
}

/// Make `installed` the active version.
///
/// Link failures are fatal; the server must never start from a half-switched
/// install. A missing data root turns the data step into a no-op.
pub fn activate(layout: &ServerLayout, installed: &InstalledPath) -> Result<()> {
    info!(
        "Initializing Bedrock server {} from '{}'",
        installed.version,
        installed.dir.display()
    );

    repoint_link(&layout.link_path, &installed.dir)?;
    mark_executable(&installed.dir.join(&layout.binary));

    if !layout.data_root.is_dir() {
        info!(
            "Data root '{}' not present, running without persistent data",
            layout.data_root.display()
        );
        return Ok(());
    }

    for entry in &layout.data_entries {
        reconcile_entry(&installed.dir, &layout.data_root, entry)?;
    }

    Ok(())
}

/// Atomically point `link` at `target` by renaming a fresh link over it.
pub fn repoint_link(link: &Path, target: &Path) -> Result<()> {
    // Sibling targets are stored relative so the install root can move.
    let link_target = match (link.parent(), target.parent(), target.file_name()) {
        (Some(link_dir), Some(target_dir), Some(name)) if same_dir(link_dir, target_dir) => {
            PathBuf::from(name)
        }
        _ => target.to_path_buf(),
    };

    let link_name = link
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SupervisorError::io(link, std::io::Error::other("link has no file name")))?;
    let staging = link.with_file_name(format!(".{link_name}.{}.tmp", std::process::id()));

    if fs::symlink_metadata(&staging).is_ok() {
        fs::remove_file(&staging).map_err(|e| SupervisorError::io(&staging, e))?;
    }

    symlink(&link_target, &staging).map_err(|e| SupervisorError::io(&staging, e))?;

    if let Err(e) = fs::rename(&staging, link) {
        fs::remove_file(&staging).ok();
        return Err(SupervisorError::io(link, e));
    }

    info!(
        "Linked '{}' -> '{}'",
        link.display(),
        link_target.display()
    );
    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| {
        if p.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            p.to_path_buf()
        }
    };
    normalize(a) == normalize(b)
}

fn mark_executable(binary: &Path) {
    if let Err(e) = fs::set_permissions(binary, fs::Permissions::from_mode(BINARY_MODE)) {
        warn!(
            "Could not mark '{}' executable: {}",
            binary.display(),
            e
        );
    }
}

/// Bring one data entry under the persistent data root.
///
/// The persistent copy always wins and is never modified. When it is missing
/// it is seeded from the install copy, once.
pub fn reconcile_entry(install_dir: &Path, data_root: &Path, entry: &str) -> Result<()> {
    let install_copy = install_dir.join(entry);
    let persistent = data_root.join(entry);

    let install_present = fs::symlink_metadata(&install_copy).is_ok();
    let persistent_present = persistent.exists();

    match (persistent_present, install_present) {
        (false, false) => {
            debug!("Data entry '{entry}' absent in both locations, skipping");
            return Ok(());
        }
        (false, true) => {
            info!(
                "Seeding persistent '{}' from the install directory",
                persistent.display()
            );
            copy_recursive(&install_copy, &persistent)?;
            remove_entry(&install_copy)?;
        }
        (true, true) => remove_entry(&install_copy)?,
        (true, false) => {}
    }

    symlink(&persistent, &install_copy).map_err(|e| SupervisorError::io(&install_copy, e))?;
    info!(
        "Linked '{}' -> '{}'",
        install_copy.display(),
        persistent.display()
    );

    Ok(())
}

fn remove_entry(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).map_err(|e| SupervisorError::io(path, e))?;

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    removed.map_err(|e| SupervisorError::io(path, e))
}

fn copy_recursive(from: &Path, to: &Path) -> Result<()> {
    let meta = fs::metadata(from).map_err(|e| SupervisorError::io(from, e))?;

    if !meta.is_dir() {
        fs::copy(from, to).map_err(|e| SupervisorError::io(to, e))?;
        return Ok(());
    }

    fs::create_dir_all(to).map_err(|e| SupervisorError::io(to, e))?;
    for item in fs::read_dir(from).map_err(|e| SupervisorError::io(from, e))? {
        let item = item.map_err(|e| SupervisorError::io(from, e))?;
        copy_recursive(&item.path(), &to.join(item.file_name()))?;
    }

    Ok(())
}
