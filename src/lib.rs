//! Snapshot Catalogue Library
//!
//! This library manages named, versioned snapshots of directory sets: each snapshot
//! owns physical copies of its associated directories inside a catalogue folder and
//! can be installed back over the original locations, edited through diffs,
//! exported/imported as zip archives, and searched line by line.

pub mod cli;
pub mod config;
pub mod io;
pub mod models;
pub mod services;

pub use config::SnapshotSettings;
pub use models::{
    DirectoryAssociation, SearchMode, SearchParams, SearchProgress, SkippedEntry, SnapEditAction,
    SnapEditType, Snapshot, SnapshotSearchResult,
};
pub use services::catalogue::{CatalogueScan, SnapshotCatalogue};
pub use services::diff::SnapshotUtils;
pub use services::manager::SnapshotManager;
pub use services::search::SnapshotSearcher;
pub use services::sort::SortBy;

use std::result;

/// Custom error type for the library
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    DuplicateId(String),
    IdMismatch { old: String, new: String },
    MissingDataKey(String),
    InvalidArchive(String),
    NotFound(String),
    Serialization(String),
    Backup(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::DuplicateId(id) => {
                write!(f, "Snapshot with id '{id}' already exists in the catalogue")
            }
            Error::IdMismatch { old, new } => {
                write!(f, "Snapshot id mismatch: old '{old}', new '{new}'")
            }
            Error::MissingDataKey(key) => write!(f, "Key '{key}' not found in data"),
            Error::InvalidArchive(msg) => write!(f, "Invalid archive: {msg}"),
            Error::NotFound(msg) => write!(f, "Not found: {msg}"),
            Error::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            Error::Backup(msg) => write!(f, "Backup failed, operation aborted: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Serialization(err.to_string())
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::InvalidArchive(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

pub type Result<T> = result::Result<T, Error>;

/// How file sizes are measured when summing a directory tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBasis {
    /// Allocated blocks on disk
    Physical,
    /// Apparent length of each file
    #[default]
    Logical,
}
