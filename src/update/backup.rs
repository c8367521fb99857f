use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::UpdateError;

/// Snapshot of the library directory taken before a mutating update.
///
/// The update's two-phase commit made explicit: `begin` captures the safe
/// copy and vacates the library path (phase 1, reversible); the caller then
/// extracts the new payload (phase 2) and finishes with exactly one of
/// `commit` or `rollback`. At most one snapshot exists per invocation.
#[derive(Debug)]
pub struct Backup {
    lib: PathBuf,
    backup: PathBuf,
    snapshotted: bool,
}

/// Start a mutating update of `lib`.
///
/// A stale backup left by an interrupted prior run is deleted first. The
/// live directory is copied aside, not renamed: if the copy fails (disk
/// full, permissions) the live install is still untouched and the update
/// aborts before any destructive step. Only after the copy succeeds is the
/// original removed.
pub fn begin(lib: &Path, backup: &Path) -> Result<Backup, UpdateError> {
    if backup.exists() {
        fs::remove_dir_all(backup).map_err(|e| UpdateError::filesystem(backup, e))?;
    }

    let snapshotted = lib.exists();
    if snapshotted {
        copy_dir(lib, backup).map_err(|e| UpdateError::filesystem(backup, e))?;
        fs::remove_dir_all(lib).map_err(|e| UpdateError::filesystem(lib, e))?;
    }

    Ok(Backup {
        lib: lib.to_path_buf(),
        backup: backup.to_path_buf(),
        snapshotted,
    })
}

impl Backup {
    /// The new payload is in place; discard the snapshot.
    pub fn commit(self) -> Result<(), UpdateError> {
        if self.snapshotted && self.backup.exists() {
            fs::remove_dir_all(&self.backup)
                .map_err(|e| UpdateError::filesystem(&self.backup, e))?;
        }

        Ok(())
    }

    /// Restore the pre-update snapshot after a failed phase 2.
    ///
    /// Any partially-extracted library content is discarded before the
    /// snapshot is copied back. When no snapshot was taken (first-ever
    /// install) there is nothing to restore and this is a no-op.
    pub fn rollback(self) -> Result<(), UpdateError> {
        if !self.snapshotted {
            return Ok(());
        }

        if self.lib.exists() {
            fs::remove_dir_all(&self.lib).map_err(|e| UpdateError::filesystem(&self.lib, e))?;
        }

        copy_dir(&self.backup, &self.lib).map_err(|e| UpdateError::filesystem(&self.lib, e))?;
        fs::remove_dir_all(&self.backup).map_err(|e| UpdateError::filesystem(&self.backup, e))?;

        Ok(())
    }
}

/// Recursively duplicate a directory tree.
fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}
