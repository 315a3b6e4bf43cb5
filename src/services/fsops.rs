//! Directory tree copy, clearing and path helpers

use crate::{Error, Result};
use rand::seq::SliceRandom;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Normalize a path lexically for comparison.
///
/// Drops `.` components and trailing separators and joins with `/`. On Windows
/// backslashes are converted as well. Does not touch the filesystem.
#[must_use]
pub fn normalize_path(path: &Path) -> String {
    let mut prefix = String::new();
    let mut parts: Vec<String> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix = p.as_os_str().to_string_lossy().to_string(),
            Component::RootDir => prefix.push('/'),
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
        }
    }

    let joined = format!("{prefix}{}", parts.join("/"));

    #[cfg(windows)]
    let joined = joined.replace('\\', "/");

    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

fn copy_file_with_metadata(src: &Path, dst: &Path) -> io::Result<()> {
    // fs::copy carries permission bits; the modification time is restored by hand
    fs::copy(src, dst)?;
    let modified = fs::metadata(src)?.modified()?;
    if let Err(e) = File::options()
        .write(true)
        .open(dst)
        .and_then(|f| f.set_modified(modified))
    {
        // read-only copies cannot be reopened for writing
        log::trace!("Could not restore mtime on {}: {e}", dst.display());
    }
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, creating `dst` if absent.
///
/// Symlinked files are copied by content; symlinked directories are skipped.
pub fn copy_dir_contents(src: &Path, dst: &Path) -> Result<u64> {
    fs::create_dir_all(dst)?;

    let mut copied = 0u64;
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_file() {
            copy_file_with_metadata(entry.path(), &target)?;
            copied += 1;
        } else if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    copy_file_with_metadata(entry.path(), &target)?;
                    copied += 1;
                }
                Ok(_) => log::warn!(
                    "Skipping symlinked directory {}",
                    entry.path().display()
                ),
                Err(e) => log::warn!(
                    "Skipping dangling symlink {}: {e}",
                    entry.path().display()
                ),
            }
        }
    }

    log::trace!(
        "Copied {copied} file(s) from {} to {}",
        src.display(),
        dst.display()
    );
    Ok(copied)
}

/// Remove everything inside `dir`, keeping `dir` itself. Creates `dir` if absent.
pub fn clear_dir_contents(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Remove a directory tree. Returns `false` when it was already gone.
pub fn remove_dir_if_exists(dir: &Path) -> Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Pick one immediate subdirectory of `root` at random.
pub fn random_subfolder(root: &Path) -> Result<Option<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs.choose(&mut rand::thread_rng()).cloned())
}
