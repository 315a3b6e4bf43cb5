//! Safety archives taken before destructive catalogue operations

use crate::io::archive;
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// The operation a backup guards; selects the file name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    PreDelete,
    PreModify,
    PreInstall,
}

impl BackupKind {
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            BackupKind::PreDelete => "backup_predelete",
            BackupKind::PreModify => "backup_premodify",
            BackupKind::PreInstall => "backup_preinstall",
        }
    }
}

/// `{prefix}_{snapshot_id}_{label}_{timestamp}` without extension
#[must_use]
pub fn backup_stem(kind: BackupKind, snapshot_id: &str, label: &str) -> String {
    format!(
        "{}_{snapshot_id}_{label}_{}",
        kind.prefix(),
        Local::now().format("%Y%m%d_%H%M%S_%3f")
    )
}

/// Archive `source_dir` under `backup_root`.
///
/// Any failure, including a missing `backup_root`, comes back as
/// `Error::Backup` so the guarded operation is never run without its copy.
pub fn write_backup(
    backup_root: Option<&Path>,
    kind: BackupKind,
    snapshot_id: &str,
    label: &str,
    source_dir: &Path,
) -> Result<PathBuf> {
    let backup_root = backup_root.ok_or_else(|| {
        Error::Backup(format!(
            "{} requested for snapshot {snapshot_id} but no backup_path is configured",
            kind.prefix()
        ))
    })?;

    let run = || -> Result<PathBuf> {
        fs::create_dir_all(backup_root)?;
        let archive_path = archive::unique_archive_path(backup_root, &backup_stem(kind, snapshot_id, label));
        archive::pack_directory(source_dir, &archive_path)?;
        Ok(archive_path)
    };

    match run() {
        Ok(path) => {
            log::info!(
                "Backup of {} written to {}",
                source_dir.display(),
                path.display()
            );
            Ok(path)
        }
        Err(e) => Err(Error::Backup(format!(
            "{} of {} into {}: {e}",
            kind.prefix(),
            source_dir.display(),
            backup_root.display()
        ))),
    }
}
