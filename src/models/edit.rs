//! Edit scripts produced by snapshot diffing

use crate::models::DirectoryAssociation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapEditType {
    #[serde(rename = "Add")]
    AddDir,
    #[serde(rename = "Remove")]
    RemoveDir,
}

impl SnapEditType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapEditType::AddDir => "Add",
            SnapEditType::RemoveDir => "Remove",
        }
    }
}

impl fmt::Display for SnapEditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a single edit step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapEdit {
    AddDir {
        path: PathBuf,
    },
    RemoveDir {
        folder_id: String,
        directory_name: String,
    },
}

/// A single diff step applied by the snapshot manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapEditAction {
    pub timestamp: DateTime<Utc>,
    pub edit: SnapEdit,
}

impl SnapEditAction {
    #[must_use]
    pub fn add_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            timestamp: Utc::now(),
            edit: SnapEdit::AddDir { path: path.into() },
        }
    }

    #[must_use]
    pub fn remove_dir(assoc: &DirectoryAssociation) -> Self {
        Self {
            timestamp: Utc::now(),
            edit: SnapEdit::RemoveDir {
                folder_id: assoc.folder_id.clone(),
                directory_name: assoc.directory_name(),
            },
        }
    }

    #[must_use]
    pub fn action_type(&self) -> SnapEditType {
        match self.edit {
            SnapEdit::AddDir { .. } => SnapEditType::AddDir,
            SnapEdit::RemoveDir { .. } => SnapEditType::RemoveDir,
        }
    }

    #[must_use]
    pub fn new_path(&self) -> Option<&Path> {
        match &self.edit {
            SnapEdit::AddDir { path } => Some(path),
            SnapEdit::RemoveDir { .. } => None,
        }
    }

    #[must_use]
    pub fn folder_id_to_remove(&self) -> Option<&str> {
        match &self.edit {
            SnapEdit::RemoveDir { folder_id, .. } => Some(folder_id),
            SnapEdit::AddDir { .. } => None,
        }
    }

    #[must_use]
    pub fn directory_name_to_remove(&self) -> Option<&str> {
        match &self.edit {
            SnapEdit::RemoveDir { directory_name, .. } => Some(directory_name),
            SnapEdit::AddDir { .. } => None,
        }
    }
}
