//! Snapshot and directory association model behavior

#[cfg(test)]
mod tests {
    use snapcat::io::snapshot::{from_json, to_json};
    use snapcat::models::{DirectoryAssociation, Snapshot, random_id};
    use snapcat::{Error, SnapshotUtils};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let snapshot = Snapshot::new("id", "name", "desc");
        assert_eq!(snapshot.author, "UnknownUser");
        assert!(snapshot.directories.is_empty());
        assert!(snapshot.date_modified().is_none());
        assert!(snapshot.date_last_used().is_none());
        assert!(snapshot.date_last_modified().is_none());
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/snapshot.json");

        let mut snapshot = Snapshot::new("rt00000001", "Round", "trip")
            .with_author("someone")
            .with_tags(["a", "b"]);
        snapshot.add_directory("/data/one");
        snapshot.add_directory("/data/two");
        snapshot.add_data_item("k", "v");

        to_json(&snapshot, &path).unwrap();
        assert_eq!(from_json(&path).unwrap(), snapshot);
        assert!(!path.with_file_name("snapshot.json.tmp").exists());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Snapshot::new("id", "n", "").with_tags(["keep"]);
        original.add_directory("/data/one");
        original.add_data_item("k", "v");

        let mut copy = original.clone();
        copy.add_tag("extra");
        copy.add_data_item("k", "changed");
        copy.add_directory("/data/two");
        copy.directories[0].original_path = "/elsewhere".to_string();

        assert_eq!(original.tags, vec!["keep"]);
        assert_eq!(original.get_data_item("k"), Some("v"));
        assert_eq!(original.directories.len(), 1);
        assert_eq!(original.directories[0].original_path, "/data/one");
    }

    #[test]
    fn test_random_ids() {
        let snapshot = Snapshot::with_random_id(12, "n", "");
        assert_eq!(snapshot.id.len(), 12);
        assert!(snapshot.id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(random_id(16), random_id(16));
    }

    #[test]
    fn test_directory_indices_are_sequential() {
        let mut snapshot = Snapshot::new("id", "n", "");
        assert_eq!(snapshot.next_dir_index(), 1);

        let first = snapshot.add_directory("/data/alpha").clone();
        let second = snapshot.add_directory("/data/beta").clone();
        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert_ne!(first.folder_id, second.folder_id);
        assert_eq!(first.folder_id.len(), 4);
        assert_eq!(second.directory_name(), "2-beta");

        // removing the highest index frees it; removing a lower one does not
        snapshot.remove_directory(&first.folder_id);
        assert_eq!(snapshot.next_dir_index(), 3);
        snapshot.remove_directory(&second.folder_id);
        assert_eq!(snapshot.next_dir_index(), 1);
    }

    #[test]
    fn test_find_and_remove_directory() {
        let mut snapshot = Snapshot::new("id", "n", "");
        let assoc = snapshot.add_directory("/data/alpha").clone();

        assert_eq!(snapshot.find_directory(&assoc.folder_id), Some(&assoc));
        assert!(snapshot.find_directory("none").is_none());
        assert_eq!(snapshot.remove_directory(&assoc.folder_id), Some(assoc));
        assert!(snapshot.remove_directory("none").is_none());
    }

    #[test]
    fn test_basename_fallback() {
        assert_eq!(DirectoryAssociation::new(3, "/", "abcd").directory_name(), "3-dir");
        assert_eq!(DirectoryAssociation::new(1, "/a/b/", "abcd").basename(), "b");
    }

    #[test]
    fn test_tags_behave_like_a_set() {
        let mut snapshot = Snapshot::new("id", "n", "").with_tags(["a", "b", "a"]);
        assert_eq!(snapshot.tags, vec!["a", "b"]);
        assert!(!snapshot.add_tag("b"));
        assert!(snapshot.add_tag("c"));
        assert!(snapshot.remove_tag("a"));
        assert!(!snapshot.remove_tag("a"));
        assert_eq!(snapshot.tags, vec!["b", "c"]);
    }

    #[test]
    fn test_data_items() {
        let mut snapshot = Snapshot::new("id", "n", "");
        snapshot.add_data_item("k", "v1");
        assert!(snapshot.has_data_item("k"));
        assert_eq!(snapshot.get_data_item("k"), Some("v1"));
        assert_eq!(snapshot.get_data_item_or("missing", "fallback"), "fallback");

        snapshot.edit_data_item("k", "v2").unwrap();
        assert_eq!(snapshot.get_data_item("k"), Some("v2"));

        let err = snapshot.edit_data_item("absent", "x").unwrap_err();
        assert!(matches!(err, Error::MissingDataKey(ref k) if k == "absent"));

        assert_eq!(snapshot.remove_data_item("k").as_deref(), Some("v2"));
        assert_eq!(snapshot.remove_data_item("k"), None);

        snapshot.add_data_item("a", "1");
        snapshot.add_data_item("b", "2");
        snapshot.clear_all_data();
        assert!(snapshot.data.is_empty());
    }

    #[test]
    fn test_assoc_dir_size() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("sized");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("a.bin"), vec![0u8; 1024 * 1024]).unwrap();
        fs::write(dir.join("nested/b.bin"), vec![0u8; 512 * 1024]).unwrap();

        let mut snapshot = Snapshot::new("id", "n", "");
        snapshot.add_directory(&dir);
        snapshot.add_directory(temp.path().join("missing"));

        assert_eq!(
            snapshot.assoc_dir_size_bytes(snapcat::SizeBasis::Logical),
            1024 * 1024 + 512 * 1024
        );
        assert!((snapshot.get_assoc_dir_mb_size() - 1.5).abs() < 1e-9);
        // allocated blocks; exact figure depends on the filesystem
        assert!(snapshot.assoc_dir_size_bytes(snapcat::SizeBasis::Physical) > 0);
    }

    #[test]
    fn test_gen_random_snap_uses_subfolders() {
        let temp = TempDir::new().unwrap();
        for name in ["one", "two", "three", "four"] {
            fs::create_dir_all(temp.path().join(name)).unwrap();
        }
        fs::write(temp.path().join("file.txt"), "not a dir").unwrap();

        let snapshot = SnapshotUtils::gen_random_snap(temp.path(), 8).unwrap();
        assert_eq!(snapshot.id.len(), 8);
        assert_eq!(snapshot.author, "User");
        assert_eq!(snapshot.tags, vec!["example", "test"]);
        let indices: Vec<u32> = snapshot.directories.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(
            snapshot
                .directories
                .iter()
                .all(|d| std::path::Path::new(&d.original_path).is_dir())
        );
    }

    #[test]
    fn test_gen_random_without_subfolders_fails() {
        let temp = TempDir::new().unwrap();
        let err = DirectoryAssociation::gen_random(temp.path(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_get_snapshot_from_path_errors() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            SnapshotUtils::get_snapshot_from_path(&file, "snapshot.json").unwrap_err(),
            Error::InvalidInput(_)
        ));
        assert!(matches!(
            SnapshotUtils::get_snapshot_from_path(&temp.path().join("absent"), "snapshot.json")
                .unwrap_err(),
            Error::Io(_)
        ));
        assert!(matches!(
            SnapshotUtils::get_snapshot_from_path(temp.path(), "snapshot.json").unwrap_err(),
            Error::Io(_)
        ));
    }
}
