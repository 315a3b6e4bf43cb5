//! Directory size computation (logical and physical) with platform-specific implementations

use crate::SizeBasis;
use std::fs::Metadata;
use std::path::Path;
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Compute logical size from metadata
#[must_use]
pub fn logical_size(metadata: &Metadata) -> u64 {
    metadata.len()
}

/// Compute physical size from metadata (Unix platform)
/// Uses the number of 512-byte blocks allocated to the file
#[cfg(unix)]
#[must_use]
pub fn physical_size(_path: &Path, metadata: &Metadata) -> u64 {
    metadata.blocks() * 512
}

/// Compute physical size (Windows platform)
/// Uses GetCompressedFileSizeW to get actual disk usage
#[cfg(windows)]
#[must_use]
pub fn physical_size(path: &Path, metadata: &Metadata) -> u64 {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::GetCompressedFileSizeW;

    const INVALID_FILE_SIZE: u32 = 0xFFFF_FFFF;

    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let mut high: u32 = 0;
    let low = unsafe { GetCompressedFileSizeW(wide.as_ptr(), &mut high) };

    if low == INVALID_FILE_SIZE {
        logical_size(metadata)
    } else {
        u64::from(high) << 32 | u64::from(low)
    }
}

/// Compute physical size (non-Unix, non-Windows fallback)
#[cfg(not(any(unix, windows)))]
#[must_use]
pub fn physical_size(_path: &Path, metadata: &Metadata) -> u64 {
    logical_size(metadata)
}

/// Total size of the regular files below `root`.
///
/// Unreadable entries are skipped; a missing `root` yields zero.
#[must_use]
pub fn dir_size(root: &Path, basis: SizeBasis) -> u64 {
    let mut total = 0u64;
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::trace!("Size walk skipped an entry under {}: {e}", root.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let size = match basis {
            SizeBasis::Logical => logical_size(&metadata),
            SizeBasis::Physical => physical_size(entry.path(), &metadata),
        };
        log::trace!("{:?} size for {}: {size}", basis, entry.path().display());
        total = total.saturating_add(size);
    }
    total
}
