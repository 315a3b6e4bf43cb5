//! Snapshot catalogue: the registry of snapshots stored under one folder
//!
//! Each snapshot lives in `<catalogue>/<id>/`. Lifecycle per id:
//! absent -> present (`add`/`import_snapshot`/`duplicate_by_id`) -> modified any
//! number of times (`update_*`) -> absent (`delete`). `install` and the exports
//! only read. Destructive operations take a backup first when the settings ask
//! for one, and abort if that backup cannot be written.

use crate::config::SnapshotSettings;
use crate::io::archive::{self, ArchiveSource};
use crate::io::lock::{self, LOCKS_DIR};
use crate::io::snapshot as serializer;
use crate::models::{SkippedEntry, SnapEditAction, Snapshot, random_id};
use crate::services::backup::{self, BackupKind};
use crate::services::diff::SnapshotUtils;
use crate::services::fsops;
use crate::services::manager::{SnapshotManager, validate_id};
use crate::{Error, Result};
use chrono::{Local, Utc};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const EXPORT_SNAPSHOT_PREFIX: &str = "snapshot_";
pub const EXPORT_DIRS_PREFIX: &str = "snapshot_dirs_";

/// Result of scanning the catalogue folder
#[derive(Debug, Default)]
pub struct CatalogueScan {
    pub snapshots: Vec<Snapshot>,
    pub skipped: Vec<SkippedEntry>,
}

pub struct SnapshotCatalogue {
    path_catalogue: PathBuf,
    settings: SnapshotSettings,
}

/// Export archive path under `dest_dir`; never an existing file.
fn export_path(dest_dir: &Path, prefix: &str, id: &str) -> PathBuf {
    let stem = format!("{prefix}{id}_{}", Local::now().format("%Y%m%d_%H%M%S"));
    archive::unique_archive_path(dest_dir, &stem)
}

fn skip_code(err: &Error) -> &'static str {
    match err {
        Error::Io(e) if e.kind() == io::ErrorKind::NotFound => "missing_json",
        Error::Io(_) => "io_error",
        Error::Serialization(_) => "invalid_json",
        _ => "invalid_entry",
    }
}

impl SnapshotCatalogue {
    /// Open (creating if needed) the catalogue at `path`.
    pub fn new(path: impl Into<PathBuf>, settings: SnapshotSettings) -> Result<Self> {
        settings.validate()?;
        let path_catalogue = path.into();
        fs::create_dir_all(&path_catalogue)?;
        Ok(Self {
            path_catalogue,
            settings,
        })
    }

    /// Open with default settings (no backups, `snapshot.json`).
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(path, SnapshotSettings::default())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path_catalogue
    }

    #[must_use]
    pub fn settings(&self) -> &SnapshotSettings {
        &self.settings
    }

    /// Re-point the catalogue at another folder, creating it if needed.
    pub fn set_catalogue_path(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        self.path_catalogue = path;
        Ok(())
    }

    /// Storage folder of snapshot `id` (whether or not it exists).
    #[must_use]
    pub fn snapshot_path(&self, id: &str) -> PathBuf {
        self.path_catalogue.join(id)
    }

    fn json_path(&self, id: &str) -> PathBuf {
        self.snapshot_path(id).join(&self.settings.json_filename)
    }

    fn manager(&self, snapshot: Snapshot) -> SnapshotManager {
        SnapshotManager::new(snapshot, &self.path_catalogue, &self.settings.json_filename)
    }

    fn backup_root(&self) -> Option<&Path> {
        self.settings.backup_path.as_deref()
    }

    fn backup_snapshot_dir(&self, kind: BackupKind, id: &str) -> Result<PathBuf> {
        backup::write_backup(
            self.backup_root(),
            kind,
            id,
            "sd",
            &self.snapshot_path(id),
        )
    }

    /// Presence check without parsing the JSON.
    #[must_use]
    pub fn exists(&self, id: &str) -> bool {
        validate_id(id).is_ok() && self.json_path(id).is_file()
    }

    fn load(&self, id: &str) -> Result<Snapshot> {
        let snapshot =
            SnapshotUtils::get_snapshot_from_path(&self.snapshot_path(id), &self.settings.json_filename)?;
        if snapshot.id != id {
            return Err(Error::Serialization(format!(
                "folder '{id}' holds a snapshot with id '{}'",
                snapshot.id
            )));
        }
        Ok(snapshot)
    }

    fn require(&self, id: &str) -> Result<Snapshot> {
        self.get_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("snapshot '{id}' is not in the catalogue")))
    }

    /// Store a new snapshot, copying all its associated directories in.
    pub fn add(&self, snapshot: &Snapshot) -> Result<()> {
        validate_id(&snapshot.id)?;
        if self.exists(&snapshot.id) {
            return Err(Error::DuplicateId(snapshot.id.clone()));
        }
        self.manager(snapshot.clone()).create()
    }

    /// Load every snapshot, recording children that are not valid snapshots.
    pub fn scan(&self) -> Result<CatalogueScan> {
        let mut children: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.path_catalogue)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || name == LOCKS_DIR || !entry.file_type()?.is_dir() {
                continue;
            }
            children.push((name, entry.path()));
        }
        children.sort();

        let mut scan = CatalogueScan::default();
        for (name, path) in children {
            match self.load(&name) {
                Ok(snapshot) => scan.snapshots.push(snapshot),
                Err(e) => {
                    log::warn!("Skipping catalogue entry {}: {e}", path.display());
                    scan.skipped.push(SkippedEntry {
                        path: path.to_string_lossy().to_string(),
                        code: skip_code(&e).to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(scan)
    }

    pub fn get_all(&self) -> Result<Vec<Snapshot>> {
        Ok(self.scan()?.snapshots)
    }

    /// `Ok(None)` when no snapshot has this id.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Snapshot>> {
        if !self.exists(id) {
            return Ok(None);
        }
        self.load(id).map(Some)
    }

    /// Remove a snapshot and its stored copies.
    pub fn delete(&self, snapshot: &Snapshot) -> Result<()> {
        validate_id(&snapshot.id)?;
        if !self.snapshot_path(&snapshot.id).exists() {
            log::warn!("Snapshot {} is not in the catalogue, nothing to delete", snapshot.id);
            return Ok(());
        }
        if self.settings.backup_pre_delete {
            self.backup_snapshot_dir(BackupKind::PreDelete, &snapshot.id)?;
        }
        self.manager(snapshot.clone()).delete()?;
        lock::remove_lock_file(&self.path_catalogue, &snapshot.id)?;
        Ok(())
    }

    /// Persist `new` over `old`: field updates plus the directory diff between them.
    ///
    /// Returns the snapshot as stored afterwards.
    pub fn update_snapshot_by_objs(&self, old: &Snapshot, new: &Snapshot) -> Result<Snapshot> {
        if old.id != new.id {
            return Err(Error::IdMismatch {
                old: old.id.clone(),
                new: new.id.clone(),
            });
        }
        let edits = SnapshotUtils::get_edits_between_snapshots(old, new);
        self.update_snapshot(new, &edits)
    }

    /// Persist the fields of `snapshot` and apply `edits` to its directories.
    pub fn update_snapshot(&self, snapshot: &Snapshot, edits: &[SnapEditAction]) -> Result<Snapshot> {
        let stored = self.require(&snapshot.id)?;

        if self.settings.backup_pre_modify {
            self.backup_snapshot_dir(BackupKind::PreModify, &snapshot.id)?;
        }

        // start from the stored document; the caller only supplies editable fields
        let mut working = stored;
        working.name = snapshot.name.clone();
        working.desc = snapshot.desc.clone();
        working.author = snapshot.author.clone();
        working.tags = snapshot.tags.clone();
        working.data = snapshot.data.clone();

        let mut manager = self.manager(working);
        manager.update_json_base_fields()?;
        manager.update_json_data_fields()?;
        manager.update_from_actions_list(edits)?;

        log::info!(
            "Updated snapshot {} ({} directory edit(s))",
            snapshot.id,
            edits.len()
        );
        Ok(manager.into_snapshot())
    }

    fn fresh_id(&self, len: usize) -> String {
        loop {
            let candidate = random_id(len);
            if !self.snapshot_path(&candidate).exists() {
                return candidate;
            }
        }
    }

    /// Copy snapshot `id` to a new entry with a fresh id and `" Copy"` appended
    /// to the name. Stored directories are physically copied.
    pub fn duplicate_by_id(&self, id: &str) -> Result<Snapshot> {
        let source = self.require(id)?;
        let source_dir = self.snapshot_path(id);

        let mut copy = source.clone();
        copy.id = self.fresh_id(self.settings.id_length);
        copy.name = format!("{} Copy", source.name);
        copy.date_created = Utc::now();
        copy.date_last_used = None;

        let target_dir = self.snapshot_path(&copy.id);
        {
            let _guard = lock::acquire(&self.path_catalogue, &copy.id)?;
            let result = (|| -> Result<()> {
                fs::create_dir_all(&target_dir)?;
                for assoc in &copy.directories {
                    let name = assoc.directory_name();
                    let stored = source_dir.join(&name);
                    if stored.is_dir() {
                        fsops::copy_dir_contents(&stored, &target_dir.join(&name))?;
                    } else {
                        log::warn!(
                            "Snapshot {id} has no stored copy of {name}, copying from {}",
                            assoc.original_path
                        );
                        assoc.copy_install_to(&target_dir)?;
                    }
                }
                serializer::to_json(&copy, &target_dir.join(&self.settings.json_filename))
            })();
            if let Err(e) = result {
                let _ = fsops::remove_dir_if_exists(&target_dir);
                return Err(e);
            }
        }

        log::info!("Duplicated snapshot {id} as {}", copy.id);
        Ok(copy)
    }

    /// Copy every stored directory back over its `original_path`.
    ///
    /// Each destination is cleared first. With `backup_pre_install`, all existing
    /// destinations are archived before any of them is touched.
    pub fn install(&self, snapshot: &Snapshot) -> Result<()> {
        let stored = self.require(&snapshot.id)?;
        let snapshot_dir = self.snapshot_path(&stored.id);

        let mut plan = Vec::with_capacity(stored.directories.len());
        for assoc in &stored.directories {
            let source = snapshot_dir.join(assoc.directory_name());
            if !source.is_dir() {
                return Err(Error::NotFound(format!(
                    "stored copy {} of snapshot {} is missing",
                    source.display(),
                    stored.id
                )));
            }
            plan.push((
                assoc.directory_name(),
                source,
                PathBuf::from(&assoc.original_path),
            ));
        }

        if self.settings.backup_pre_install {
            for (directory_name, _, destination) in &plan {
                if destination.is_dir() {
                    backup::write_backup(
                        self.backup_root(),
                        BackupKind::PreInstall,
                        &stored.id,
                        &format!("ad-{directory_name}"),
                        destination,
                    )?;
                }
            }
        }

        for (_, source, destination) in &plan {
            log::debug!("Installing {} -> {}", source.display(), destination.display());
            fsops::clear_dir_contents(destination)?;
            fsops::copy_dir_contents(source, destination)?;
        }

        self.manager(stored).update_json_last_used()?;
        log::info!("Installed snapshot {}", snapshot.id);
        Ok(())
    }

    /// Delete the installed directories at each association's `original_path`.
    ///
    /// Returns how many were removed. Unknown ids are logged and ignored.
    pub fn remove_installed_copies(&self, id: &str) -> Result<usize> {
        let Some(snapshot) = self.get_by_id(id)? else {
            log::warn!("Snapshot {id} not found, no installed copies removed");
            return Ok(0);
        };

        let mut removed = 0;
        for assoc in &snapshot.directories {
            if fsops::remove_dir_if_exists(Path::new(&assoc.original_path))? {
                removed += 1;
            } else {
                log::debug!("{} already absent", assoc.original_path);
            }
        }
        log::info!("Removed {removed} installed copies of snapshot {id}");
        Ok(removed)
    }

    /// Archive only the associated directories, each rooted at its leaf name.
    pub fn export_assoc_dirs(&self, id: &str, dest_dir: &Path) -> Result<PathBuf> {
        let snapshot = self.require(id)?;
        let snapshot_dir = self.snapshot_path(id);
        let _guard = lock::acquire(&self.path_catalogue, id)?;

        let stored: Vec<(PathBuf, String)> = snapshot
            .directories
            .iter()
            .map(|d| (snapshot_dir.join(d.directory_name()), d.directory_name()))
            .collect();

        let mut used = HashSet::new();
        let mut sources = Vec::with_capacity(stored.len());
        for (assoc, (path, directory_name)) in snapshot.directories.iter().zip(&stored) {
            let basename = assoc.basename();
            let prefix = if used.insert(basename.clone()) {
                basename
            } else {
                directory_name.clone()
            };
            sources.push(ArchiveSource::Dir {
                path: path.as_path(),
                prefix,
            });
        }

        let archive_path = export_path(dest_dir, EXPORT_DIRS_PREFIX, id);
        let files = archive::write_archive(&archive_path, &sources)?;
        log::info!(
            "Exported {files} file(s) of snapshot {id} to {}",
            archive_path.display()
        );
        Ok(archive_path)
    }

    /// Archive the whole snapshot folder, JSON included.
    pub fn export_snapshot(&self, id: &str, dest_dir: &Path) -> Result<PathBuf> {
        if !self.exists(id) {
            return Err(Error::NotFound(format!("snapshot '{id}' is not in the catalogue")));
        }
        let _guard = lock::acquire(&self.path_catalogue, id)?;

        let archive_path = export_path(dest_dir, EXPORT_SNAPSHOT_PREFIX, id);
        let files = archive::pack_directory(&self.snapshot_path(id), &archive_path)?;
        log::info!(
            "Exported snapshot {id} ({files} file(s)) to {}",
            archive_path.display()
        );
        Ok(archive_path)
    }

    /// Register a snapshot from an archive written by [`Self::export_snapshot`].
    pub fn import_snapshot(&self, archive_path: &Path) -> Result<Snapshot> {
        if !archive_path.is_file() {
            return Err(Error::InvalidArchive(format!(
                "{} is not a file",
                archive_path.display()
            )));
        }

        let json_name = &self.settings.json_filename;
        let text = archive::read_entry_to_string(archive_path, json_name)?.ok_or_else(|| {
            Error::InvalidArchive(format!(
                "{} does not contain {json_name}",
                archive_path.display()
            ))
        })?;
        let snapshot = serializer::parse_snapshot(&text).map_err(|e| {
            Error::InvalidArchive(format!("{json_name} in {}: {e}", archive_path.display()))
        })?;
        validate_id(&snapshot.id)?;

        if self.exists(&snapshot.id) {
            return Err(Error::DuplicateId(snapshot.id));
        }

        let target_dir = self.snapshot_path(&snapshot.id);
        {
            let _guard = lock::acquire(&self.path_catalogue, &snapshot.id)?;
            fsops::clear_dir_contents(&target_dir)?;
            if let Err(e) = archive::extract_to(archive_path, &target_dir) {
                let _ = fsops::remove_dir_if_exists(&target_dir);
                return Err(e);
            }
        }

        let imported = self.load(&snapshot.id)?;
        log::info!(
            "Imported snapshot {} from {}",
            imported.id,
            archive_path.display()
        );
        Ok(imported)
    }
}
