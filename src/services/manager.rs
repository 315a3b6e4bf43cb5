//! On-disk representation of one snapshot inside a catalogue
//!
//! Layout: `<catalogue>/<id>/<json_filename>` plus one `<index>-<basename>` folder
//! per directory association. Every mutating operation holds the snapshot's lock
//! file for its whole duration.

use crate::io::lock::{self, SnapshotLock};
use crate::io::snapshot::{self as serializer, timestamp};
use crate::models::{DirectoryAssociation, SnapEdit, SnapEditAction, Snapshot};
use crate::services::fsops;
use crate::{Error, Result};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Check that `id` can be used as a catalogue folder name.
pub fn validate_id(id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\', ':'])
        || id.chars().any(char::is_control);
    if bad {
        return Err(Error::InvalidInput(format!(
            "'{id}' is not a valid snapshot id"
        )));
    }
    Ok(())
}

pub struct SnapshotManager {
    snapshot: Snapshot,
    catalogue_root: PathBuf,
    path_snapshot: PathBuf,
    path_snapshot_json: PathBuf,
}

impl SnapshotManager {
    #[must_use]
    pub fn new(snapshot: Snapshot, catalogue_root: &Path, json_filename: &str) -> Self {
        let path_snapshot = catalogue_root.join(&snapshot.id);
        let path_snapshot_json = path_snapshot.join(json_filename);
        Self {
            snapshot,
            catalogue_root: catalogue_root.to_path_buf(),
            path_snapshot,
            path_snapshot_json,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// In-memory model; changes reach disk through the `update_*` methods.
    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.snapshot
    }

    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    #[must_use]
    pub fn path_snapshot(&self) -> &Path {
        &self.path_snapshot
    }

    #[must_use]
    pub fn path_snapshot_json(&self) -> &Path {
        &self.path_snapshot_json
    }

    fn lock(&self) -> Result<SnapshotLock> {
        lock::acquire(&self.catalogue_root, &self.snapshot.id)
    }

    fn save_json(&self) -> Result<()> {
        serializer::to_json(&self.snapshot, &self.path_snapshot_json)
    }

    /// Patch only the `directories` key; dates and unknown keys stay as stored.
    fn save_directories(&self) -> Result<()> {
        serializer::update_field(
            &self.path_snapshot_json,
            "directories",
            serde_json::to_value(&self.snapshot.directories)?,
        )
    }

    fn ensure_created(&self) -> Result<()> {
        if self.path_snapshot_json.is_file() {
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "snapshot {} has no stored copy at {}",
                self.snapshot.id,
                self.path_snapshot.display()
            )))
        }
    }

    /// Materialize the snapshot: clear any previous folder, copy every
    /// association in, then write the JSON.
    ///
    /// No rollback: a failed copy leaves the folder partially filled.
    pub fn create(&self) -> Result<()> {
        validate_id(&self.snapshot.id)?;
        let _guard = self.lock()?;

        if self.path_snapshot.exists() {
            log::debug!("Clearing existing folder {}", self.path_snapshot.display());
        }
        fsops::clear_dir_contents(&self.path_snapshot)?;

        for assoc in &self.snapshot.directories {
            assoc.copy_install_to(&self.path_snapshot)?;
        }
        self.save_json()?;

        log::info!(
            "Created snapshot {} ({} directories) at {}",
            self.snapshot.id,
            self.snapshot.directories.len(),
            self.path_snapshot.display()
        );
        Ok(())
    }

    /// Remove the snapshot folder. Returns `false` if it did not exist.
    pub fn delete(&self) -> Result<bool> {
        let _guard = self.lock()?;
        let removed = fsops::remove_dir_if_exists(&self.path_snapshot)?;
        if removed {
            log::info!("Deleted snapshot {}", self.snapshot.id);
        }
        Ok(removed)
    }

    /// Persist name, desc, author and tags, stamping `date_modified`.
    pub fn update_json_base_fields(&mut self) -> Result<()> {
        let _guard = self.lock()?;
        self.ensure_created()?;

        let now = Utc::now();
        serializer::update_fields(
            &self.path_snapshot_json,
            vec![
                ("name", Value::String(self.snapshot.name.clone())),
                ("desc", Value::String(self.snapshot.desc.clone())),
                ("author", Value::String(self.snapshot.author.clone())),
                ("tags", serde_json::to_value(&self.snapshot.tags)?),
                ("date_modified", timestamp::to_value(Some(&now))),
            ],
        )?;
        self.snapshot.date_modified = Some(now);
        Ok(())
    }

    /// Persist the data map, stamping `date_last_modified`.
    pub fn update_json_data_fields(&mut self) -> Result<()> {
        let _guard = self.lock()?;
        self.ensure_created()?;

        let now = Utc::now();
        serializer::update_fields(
            &self.path_snapshot_json,
            vec![
                ("data", serde_json::to_value(&self.snapshot.data)?),
                ("date_last_modified", timestamp::to_value(Some(&now))),
            ],
        )?;
        self.snapshot.date_last_modified = Some(now);
        Ok(())
    }

    /// Persist `date_last_used` as now.
    pub fn update_json_last_used(&mut self) -> Result<()> {
        let _guard = self.lock()?;
        self.ensure_created()?;

        let now = Utc::now();
        serializer::update_field(
            &self.path_snapshot_json,
            "date_last_used",
            timestamp::to_value(Some(&now)),
        )?;
        self.snapshot.date_last_used = Some(now);
        Ok(())
    }

    /// Bind `path` as a new association, copy it in and persist.
    pub fn install_directory(&mut self, path: &Path) -> Result<DirectoryAssociation> {
        let _guard = self.lock()?;
        self.install_directory_locked(path)
    }

    fn install_directory_locked(&mut self, path: &Path) -> Result<DirectoryAssociation> {
        self.ensure_created()?;
        if !path.is_dir() {
            return Err(Error::InvalidInput(format!(
                "The provided path {} is not a valid directory",
                path.display()
            )));
        }

        let absolute = std::path::absolute(path)?;
        let assoc = self.snapshot.add_directory(&absolute).clone();

        if let Err(e) = assoc.copy_install_to(&self.path_snapshot) {
            self.snapshot.remove_directory(&assoc.folder_id);
            let _ = fsops::remove_dir_if_exists(&self.path_snapshot.join(assoc.directory_name()));
            return Err(e);
        }
        self.save_directories()?;

        log::info!(
            "Installed {} into snapshot {} as {}",
            absolute.display(),
            self.snapshot.id,
            assoc.directory_name()
        );
        Ok(assoc)
    }

    /// Drop the association with `folder_id` and its stored copy.
    ///
    /// Returns `false` (and changes nothing) when no association has that id.
    pub fn uninstall_directory_by_folder_id(&mut self, folder_id: &str) -> Result<bool> {
        let _guard = self.lock()?;
        self.uninstall_directory_locked(folder_id)
    }

    fn uninstall_directory_locked(&mut self, folder_id: &str) -> Result<bool> {
        let Some(assoc) = self.snapshot.find_directory(folder_id).cloned() else {
            log::warn!(
                "Snapshot {} has no directory with folder id '{folder_id}'",
                self.snapshot.id
            );
            return Ok(false);
        };

        fsops::remove_dir_if_exists(&self.path_snapshot.join(assoc.directory_name()))?;
        self.snapshot.remove_directory(folder_id);
        self.save_directories()?;

        log::info!(
            "Removed {} from snapshot {}",
            assoc.directory_name(),
            self.snapshot.id
        );
        Ok(true)
    }

    /// Apply `edits` in order under a single lock.
    ///
    /// Each action is persisted before the next runs; a failure leaves the
    /// earlier actions applied.
    pub fn update_from_actions_list(&mut self, edits: &[SnapEditAction]) -> Result<()> {
        let _guard = self.lock()?;
        for edit in edits {
            log::debug!("Applying {} to snapshot {}", edit.action_type(), self.snapshot.id);
            match &edit.edit {
                SnapEdit::AddDir { path } => {
                    self.install_directory_locked(path)?;
                }
                SnapEdit::RemoveDir { folder_id, .. } => {
                    self.uninstall_directory_locked(folder_id)?;
                }
            }
        }
        Ok(())
    }
}
