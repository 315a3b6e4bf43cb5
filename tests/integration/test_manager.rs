//! Per-snapshot storage operations driven directly through the manager

#[cfg(test)]
mod tests {
    use crate::fixtures::{create_source_dirs, snapshot_with_dirs};
    use snapcat::io::lock;
    use snapcat::io::snapshot::from_json;
    use snapcat::{Error, Snapshot, SnapshotManager};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_lays_out_storage() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let manager = SnapshotManager::new(
            snapshot_with_dirs("mgr0000001", "Layout", &dirs),
            &root,
            "snapshot.json",
        );
        manager.create().unwrap();

        assert_eq!(manager.path_snapshot(), root.join("mgr0000001"));
        assert!(manager.path_snapshot_json().is_file());
        for name in ["1-dir1", "2-dir2", "3-dir3"] {
            assert!(manager.path_snapshot().join(name).is_dir(), "{name}");
        }
        let stored = from_json(manager.path_snapshot_json()).unwrap();
        assert_eq!(stored.directories.len(), 3);
    }

    #[test]
    fn test_create_replaces_previous_contents() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");
        let stale = root.join("mgr0000002/stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        SnapshotManager::new(
            snapshot_with_dirs("mgr0000002", "Fresh", &dirs[..1]),
            &root,
            "snapshot.json",
        )
        .create()
        .unwrap();

        assert!(!stale.exists());
    }

    #[test]
    fn test_create_fails_when_source_missing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("catalogue");
        let mut snapshot = Snapshot::new("mgr0000003", "Missing", "");
        snapshot.add_directory(temp.path().join("does_not_exist"));

        let err = SnapshotManager::new(snapshot, &root, "snapshot.json")
            .create()
            .unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_install_and_uninstall_directory() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let mut manager = SnapshotManager::new(
            snapshot_with_dirs("mgr0000004", "Grow", &dirs[..1]),
            &root,
            "snapshot.json",
        );
        manager.create().unwrap();

        let assoc = manager.install_directory(&dirs[1]).unwrap();
        assert_eq!(assoc.index, 2);
        assert_eq!(assoc.directory_name(), "2-dir2");
        assert!(manager.path_snapshot().join("2-dir2/file2.txt").is_file());
        assert_eq!(from_json(manager.path_snapshot_json()).unwrap().directories.len(), 2);

        assert!(manager.uninstall_directory_by_folder_id(&assoc.folder_id).unwrap());
        assert!(!manager.path_snapshot().join("2-dir2").exists());
        assert_eq!(manager.snapshot().directories.len(), 1);
        assert_eq!(from_json(manager.path_snapshot_json()).unwrap().directories.len(), 1);
    }

    #[test]
    fn test_uninstall_unknown_folder_id_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let mut manager = SnapshotManager::new(
            snapshot_with_dirs("mgr0000005", "Stable", &dirs[..1]),
            &root,
            "snapshot.json",
        );
        manager.create().unwrap();
        let before = fs::read_to_string(manager.path_snapshot_json()).unwrap();

        assert!(!manager.uninstall_directory_by_folder_id("zzzz").unwrap());
        assert_eq!(fs::read_to_string(manager.path_snapshot_json()).unwrap(), before);
    }

    #[test]
    fn test_install_directory_rejects_files_and_uncreated_snapshots() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let mut pending = SnapshotManager::new(
            Snapshot::new("mgr0000006", "Pending", ""),
            &root,
            "snapshot.json",
        );
        assert!(matches!(
            pending.install_directory(&dirs[0]).unwrap_err(),
            Error::NotFound(_)
        ));

        pending.create().unwrap();
        let err = pending
            .install_directory(&dirs[0].join("file1.txt"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(pending.snapshot().directories.is_empty());
    }

    #[test]
    fn test_last_used_is_persisted() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let mut manager = SnapshotManager::new(
            snapshot_with_dirs("mgr0000007", "Used", &dirs[..1]),
            &root,
            "snapshot.json",
        );
        manager.create().unwrap();
        manager.update_json_last_used().unwrap();

        let stored = from_json(manager.path_snapshot_json()).unwrap();
        assert_eq!(
            stored.date_last_used().map(|d| d.timestamp_millis()),
            manager.snapshot().date_last_used().map(|d| d.timestamp_millis())
        );
    }

    #[test]
    fn test_lock_is_exclusive_and_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let held = lock::acquire(root, "locked0001").unwrap();
        assert!(held.path().ends_with(".locks/locked0001.lock"));
        assert!(lock::try_acquire(root, "locked0001").is_err());
        assert!(lock::try_acquire(root, "other00001").is_ok());

        drop(held);
        assert!(lock::try_acquire(root, "locked0001").is_ok());
    }

    #[test]
    fn test_delete_reports_absence() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let root = temp.path().join("catalogue");

        let manager = SnapshotManager::new(
            snapshot_with_dirs("mgr0000008", "Gone", &dirs[..1]),
            &root,
            "snapshot.json",
        );
        manager.create().unwrap();
        assert!(manager.delete().unwrap());
        assert!(!manager.delete().unwrap());
    }
}
