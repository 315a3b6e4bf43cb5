//! Error paths: backup aborts and hostile archives

#[cfg(test)]
mod tests {
    use crate::fixtures::{create_source_dirs, open_catalogue, snapshot_with_dirs};
    use snapcat::io::archive::extract_to;
    use snapcat::{Error, SnapshotCatalogue, SnapshotSettings};
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn catalogue_with_flags_but_no_backup_path(temp: &TempDir) -> SnapshotCatalogue {
        let settings = SnapshotSettings {
            backup_pre_delete: true,
            backup_pre_install: true,
            ..SnapshotSettings::default()
        };
        SnapshotCatalogue::new(temp.path().join("catalogue"), settings).unwrap()
    }

    #[test]
    fn test_delete_aborts_without_backup_path() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let catalogue = catalogue_with_flags_but_no_backup_path(&temp);

        let snapshot = snapshot_with_dirs("err0000001", "Keep me", &dirs[..1]);
        catalogue.add(&snapshot).unwrap();

        let err = catalogue.delete(&snapshot).unwrap_err();
        assert!(matches!(err, Error::Backup(_)));
        assert!(catalogue.get_by_id("err0000001").unwrap().is_some());
    }

    #[test]
    fn test_install_aborts_without_backup_path() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        let catalogue = catalogue_with_flags_but_no_backup_path(&temp);

        let snapshot = snapshot_with_dirs("err0000002", "Guarded", &dirs[..1]);
        catalogue.add(&snapshot).unwrap();
        fs::write(dirs[0].join("file1.txt"), "local change").unwrap();

        let err = catalogue.install(&snapshot).unwrap_err();
        assert!(matches!(err, Error::Backup(_)));
        assert_eq!(
            fs::read_to_string(dirs[0].join("file1.txt")).unwrap(),
            "local change"
        );
    }

    #[test]
    fn test_backup_into_unwritable_location_aborts() {
        let temp = TempDir::new().unwrap();
        let dirs = create_source_dirs(temp.path()).unwrap();
        // a regular file where the backup folder should be
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();
        let settings = SnapshotSettings {
            backup_path: Some(blocker.join("backups")),
            backup_pre_delete: true,
            ..SnapshotSettings::default()
        };
        let catalogue = SnapshotCatalogue::new(temp.path().join("catalogue"), settings).unwrap();

        let snapshot = snapshot_with_dirs("err0000003", "Blocked", &dirs[..1]);
        catalogue.add(&snapshot).unwrap();

        assert!(matches!(catalogue.delete(&snapshot).unwrap_err(), Error::Backup(_)));
        assert!(catalogue.snapshot_path("err0000003").is_dir());
    }

    #[test]
    fn test_extract_rejects_escaping_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("evil.zip");
        {
            let mut writer = ZipWriter::new(File::create(&archive).unwrap());
            writer
                .start_file("../escaped.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"nope").unwrap();
            writer.finish().unwrap();
        }

        let dest = temp.path().join("dest");
        let err = extract_to(&archive, &dest).unwrap_err();
        assert!(matches!(err, Error::InvalidArchive(_)));
        assert!(!temp.path().join("escaped.txt").exists());
    }

    #[test]
    fn test_import_rejects_invalid_id_in_archive() {
        let temp = TempDir::new().unwrap();
        let catalogue = open_catalogue(temp.path());
        let archive = temp.path().join("bad_id.zip");
        {
            let mut writer = ZipWriter::new(File::create(&archive).unwrap());
            writer
                .start_file("snapshot.json", SimpleFileOptions::default())
                .unwrap();
            writer
                .write_all(br#"{"id": "../up", "name": "bad", "desc": ""}"#)
                .unwrap();
            writer.finish().unwrap();
        }

        let err = catalogue.import_snapshot(&archive).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(catalogue.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_settings_refuse_to_open() {
        let temp = TempDir::new().unwrap();
        let settings = SnapshotSettings {
            id_length: 0,
            ..SnapshotSettings::default()
        };
        assert!(matches!(
            SnapshotCatalogue::new(temp.path().join("cat"), settings),
            Err(Error::InvalidInput(_))
        ));
    }
}
