//! Settings loading and validation

#[cfg(test)]
mod tests {
    use snapcat::{Error, SnapshotCatalogue, SnapshotSettings};
    use std::fs;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_defaults() {
        let settings = SnapshotSettings::default();
        assert!(settings.backup_path.is_none());
        assert!(!settings.backup_pre_delete);
        assert!(!settings.backup_pre_install);
        assert!(!settings.backup_pre_modify);
        assert_eq!(settings.json_filename, "snapshot.json");
        assert_eq!(settings.id_length, 10);
    }

    #[test]
    fn test_load_partial_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"{"backup_path": "/var/backups/snaps", "backup_pre_delete": true}"#,
        )
        .unwrap();

        let settings = SnapshotSettings::load(file.path()).unwrap();
        assert_eq!(
            settings.backup_path.as_deref(),
            Some(std::path::Path::new("/var/backups/snaps"))
        );
        assert!(settings.backup_pre_delete);
        assert!(!settings.backup_pre_modify);
        assert_eq!(settings.json_filename, "snapshot.json");
    }

    #[test]
    fn test_load_rejects_bad_values() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"json_filename": "nested/snap.json"}"#).unwrap();
        assert!(matches!(
            SnapshotSettings::load(file.path()).unwrap_err(),
            Error::InvalidInput(_)
        ));

        fs::write(file.path(), r#"{"id_length": 0}"#).unwrap();
        assert!(matches!(
            SnapshotSettings::load(file.path()).unwrap_err(),
            Error::InvalidInput(_)
        ));

        fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            SnapshotSettings::load(file.path()).unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_custom_json_filename_is_used() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src");
        fs::create_dir_all(&source).unwrap();
        let settings = SnapshotSettings {
            json_filename: "meta.json".to_string(),
            ..SnapshotSettings::default()
        };
        let catalogue = SnapshotCatalogue::new(temp.path().join("cat"), settings).unwrap();

        let mut snapshot = snapcat::Snapshot::new("custom0001", "Custom", "");
        snapshot.add_directory(&source);
        catalogue.add(&snapshot).unwrap();

        assert!(catalogue.snapshot_path("custom0001").join("meta.json").is_file());
        assert!(catalogue.get_by_id("custom0001").unwrap().is_some());
    }
}
