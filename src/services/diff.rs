//! Snapshot diffing and helper constructors

use crate::io::snapshot as serializer;
use crate::models::{DirectoryAssociation, SnapEditAction, Snapshot};
use crate::services::fsops::normalize_path;
use crate::services::sort::{self, SortBy};
use crate::{Error, Result};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Stateless helpers over snapshots
pub struct SnapshotUtils;

impl SnapshotUtils {
    /// Edit script turning `old`'s directory set into `new`'s.
    ///
    /// Compares normalized `original_path`s only. Every path in `new` but not in
    /// `old` yields an ADD_DIR (in `new` order), then every association of `old`
    /// whose path is missing from `new` yields a REMOVE_DIR (in `old` order).
    #[must_use]
    pub fn get_edits_between_snapshots(old: &Snapshot, new: &Snapshot) -> Vec<SnapEditAction> {
        let old_paths: HashSet<String> = old
            .directories
            .iter()
            .map(|d| normalize_path(Path::new(&d.original_path)))
            .collect();
        let new_paths: HashSet<String> = new
            .directories
            .iter()
            .map(|d| normalize_path(Path::new(&d.original_path)))
            .collect();

        let mut edits = Vec::new();
        let mut queued: HashSet<String> = HashSet::new();

        for assoc in &new.directories {
            let key = normalize_path(Path::new(&assoc.original_path));
            if !old_paths.contains(&key) && queued.insert(key.clone()) {
                edits.push(SnapEditAction::add_dir(PathBuf::from(key)));
            }
        }

        for assoc in &old.directories {
            let key = normalize_path(Path::new(&assoc.original_path));
            if !new_paths.contains(&key) {
                edits.push(SnapEditAction::remove_dir(assoc));
            }
        }

        log::debug!(
            "Diff {} -> {}: {} edit(s)",
            old.id,
            new.id,
            edits.len()
        );
        edits
    }

    /// Stable sort of `snapshots` by `sort_by`.
    pub fn sort_snapshots(snapshots: &mut Vec<Snapshot>, sort_by: SortBy, reverse: bool) {
        sort::sort_snapshots(snapshots, sort_by, reverse);
    }

    /// Build a snapshot of three random subfolders of `source_root`.
    pub fn gen_random_snap(source_root: &Path, id_length: usize) -> Result<Snapshot> {
        let mut snapshot = Snapshot::with_random_id(
            id_length,
            format!("Snapshot {}", crate::models::random_id(5)),
            "Randomly generated snapshot",
        )
        .with_author("User")
        .with_tags(["example", "test"]);

        for _ in 0..3 {
            let assoc = DirectoryAssociation::gen_random(source_root, snapshot.next_dir_index())?;
            snapshot.directories.push(assoc);
        }
        Ok(snapshot)
    }

    /// Load the snapshot stored in `snapshot_dir`.
    pub fn get_snapshot_from_path(snapshot_dir: &Path, json_filename: &str) -> Result<Snapshot> {
        if snapshot_dir.is_file() {
            return Err(Error::InvalidInput(format!(
                "The provided path {} is not a directory",
                snapshot_dir.display()
            )));
        }
        if !snapshot_dir.exists() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("The provided path {} does not exist", snapshot_dir.display()),
            )));
        }
        let json_path = snapshot_dir.join(json_filename);
        if !json_path.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("No {json_filename} file found in {}", snapshot_dir.display()),
            )));
        }
        serializer::from_json(&json_path)
    }
}
