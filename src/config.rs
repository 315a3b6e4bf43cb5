//! Catalogue settings

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_JSON_FILENAME: &str = "snapshot.json";
pub const DEFAULT_ID_LENGTH: usize = 10;

/// Options consumed by [`crate::SnapshotCatalogue`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSettings {
    pub backup_path: Option<PathBuf>,
    pub backup_pre_delete: bool,
    pub backup_pre_install: bool,
    pub backup_pre_modify: bool,
    pub json_filename: String,
    pub id_length: usize,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            backup_path: None,
            backup_pre_delete: false,
            backup_pre_install: false,
            backup_pre_modify: false,
            json_filename: DEFAULT_JSON_FILENAME.to_string(),
            id_length: DEFAULT_ID_LENGTH,
        }
    }
}

impl SnapshotSettings {
    /// Settings with every backup enabled, written under `backup_path`.
    #[must_use]
    pub fn with_backups(backup_path: impl Into<PathBuf>) -> Self {
        Self {
            backup_path: Some(backup_path.into()),
            backup_pre_delete: true,
            backup_pre_install: true,
            backup_pre_modify: true,
            ..Self::default()
        }
    }

    /// Read settings from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text).map_err(|e| {
            Error::Serialization(format!("settings file {}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.json_filename.trim().is_empty()
            || self.json_filename.contains(['/', '\\'])
        {
            return Err(Error::InvalidInput(format!(
                "json_filename must be a bare file name, got '{}'",
                self.json_filename
            )));
        }
        if self.id_length == 0 {
            return Err(Error::InvalidInput(
                "id_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
