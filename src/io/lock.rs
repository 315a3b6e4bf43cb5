//! Advisory lock files guarding per-snapshot mutations.
//!
//! One lock file per snapshot id: `<catalogue>/.locks/<id>.lock`. The lock lives
//! outside the snapshot folder so that clearing or deleting the folder never
//! touches it. Released on drop.

use crate::Result;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const LOCKS_DIR: &str = ".locks";

pub struct SnapshotLock {
    file: File,
    path: PathBuf,
}

impl SnapshotLock {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        // unlock errors on drop are ignored; closing the handle releases the lock anyway
        let _ = self.file.unlock();
    }
}

#[must_use]
pub fn lock_file_path(catalogue_root: &Path, snapshot_id: &str) -> PathBuf {
    catalogue_root
        .join(LOCKS_DIR)
        .join(format!("{snapshot_id}.lock"))
}

fn open_lock_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)?;
    Ok(file)
}

/// Block until the exclusive lock for `snapshot_id` is held.
pub fn acquire(catalogue_root: &Path, snapshot_id: &str) -> Result<SnapshotLock> {
    let path = lock_file_path(catalogue_root, snapshot_id);
    let file = open_lock_file(&path)?;
    file.lock_exclusive()?;
    log::trace!("Acquired lock {}", path.display());
    Ok(SnapshotLock { file, path })
}

/// Remove the lock file of a snapshot that no longer exists.
///
/// Call only after the guard has been dropped.
pub fn remove_lock_file(catalogue_root: &Path, snapshot_id: &str) -> Result<()> {
    let path = lock_file_path(catalogue_root, snapshot_id);
    match fs::remove_file(&path) {
        Ok(()) => {
            log::trace!("Removed lock {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Take the exclusive lock for `snapshot_id` or fail immediately if held elsewhere.
pub fn try_acquire(catalogue_root: &Path, snapshot_id: &str) -> Result<SnapshotLock> {
    let path = lock_file_path(catalogue_root, snapshot_id);
    let file = open_lock_file(&path)?;
    file.try_lock_exclusive()?;
    Ok(SnapshotLock { file, path })
}
