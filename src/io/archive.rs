//! Zip archive packaging for export, import and backups
//!
//! Entry names always use `/` separators and are relative to the archive root.
//! Directories are written as explicit entries so that empty folders survive a
//! round trip.

use crate::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Something to place into an archive
#[derive(Debug, Clone)]
pub enum ArchiveSource<'a> {
    /// Every entry below `path`, rooted at `prefix` (empty for the archive root)
    Dir { path: &'a Path, prefix: String },
    /// A single file stored as `name`
    File { path: &'a Path, name: String },
}

/// `{dir}/{stem}.zip`, or `{stem}-{n}.zip` with the first free `n`.
#[must_use]
pub fn unique_archive_path(dir: &Path, stem: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{stem}.zip"));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}-{n}.zip"));
        n += 1;
    }
    candidate
}

fn file_options(len: u64) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(len >= u64::from(u32::MAX))
}

fn entry_name(prefix: &str, rel: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !prefix.is_empty() {
        parts.push(prefix.trim_end_matches('/').to_string());
    }
    parts.extend(rel.components().filter_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().to_string()),
        _ => None,
    }));
    parts.join("/")
}

fn add_file(writer: &mut ZipWriter<File>, path: &Path, name: &str) -> Result<()> {
    let len = fs::metadata(path)?.len();
    writer.start_file(name, file_options(len))?;
    let mut source = File::open(path)?;
    io::copy(&mut source, writer)?;
    Ok(())
}

fn add_dir_tree(writer: &mut ZipWriter<File>, root: &Path, prefix: &str) -> Result<usize> {
    if !root.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", root.display()),
        )));
    }

    let dir_options = SimpleFileOptions::default();
    if !prefix.is_empty() {
        writer.add_directory(entry_name(prefix, Path::new("")), dir_options)?;
    }

    let mut files = 0;
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let name = entry_name(prefix, rel);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            writer.add_directory(name, dir_options)?;
        } else if file_type.is_file() || fs::metadata(entry.path()).is_ok_and(|m| m.is_file()) {
            add_file(writer, entry.path(), &name)?;
            files += 1;
        } else {
            log::warn!("Skipping non-file entry in archive: {}", entry.path().display());
        }
    }
    Ok(files)
}

/// Create `archive_path` from `sources`, returning the number of files written.
pub fn write_archive(archive_path: &Path, sources: &[ArchiveSource<'_>]) -> Result<usize> {
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(file);
    let mut files = 0;

    for source in sources {
        match source {
            ArchiveSource::Dir { path, prefix } => {
                files += add_dir_tree(&mut writer, path, prefix)?;
            }
            ArchiveSource::File { path, name } => {
                add_file(&mut writer, path, name)?;
                files += 1;
            }
        }
    }

    writer.finish()?;
    log::debug!("Wrote {files} file(s) to {}", archive_path.display());
    Ok(files)
}

/// Archive a whole directory tree with entries relative to `dir`.
pub fn pack_directory(dir: &Path, archive_path: &Path) -> Result<usize> {
    write_archive(
        archive_path,
        &[ArchiveSource::Dir {
            path: dir,
            prefix: String::new(),
        }],
    )
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(archive_path)?;
    ZipArchive::new(file).map_err(|e| {
        Error::InvalidArchive(format!(
            "{} is not a valid zip archive: {e}",
            archive_path.display()
        ))
    })
}

/// Names of every entry in the archive.
pub fn entry_names(archive_path: &Path) -> Result<Vec<String>> {
    let archive = open_archive(archive_path)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Read a UTF-8 entry, or `None` when the archive has no such entry.
pub fn read_entry_to_string(archive_path: &Path, name: &str) -> Result<Option<String>> {
    let mut archive = open_archive(archive_path)?;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    io::Read::read_to_string(&mut entry, &mut text).map_err(|e| {
        Error::InvalidArchive(format!("entry '{name}' is not valid UTF-8 text: {e}"))
    })?;
    Ok(Some(text))
}

/// Unpack every entry below `dest`, returning the number of files written.
///
/// Entries whose names would escape `dest` are rejected.
pub fn extract_to(archive_path: &Path, dest: &Path) -> Result<usize> {
    let mut archive = open_archive(archive_path)?;
    fs::create_dir_all(dest)?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(rel) = entry.enclosed_name() else {
            return Err(Error::InvalidArchive(format!(
                "entry '{}' points outside the destination",
                entry.name()
            )));
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;
    }
    Ok(files)
}
