//! Data models for snapshots, directory associations, edit scripts and search results

mod edit;
mod search;
mod snapshot;

pub use edit::{SnapEdit, SnapEditAction, SnapEditType};
pub use search::{SearchMode, SearchParams, SearchProgress, SnapshotSearchResult};
pub use snapshot::{
    DEFAULT_AUTHOR, DirectoryAssociation, FOLDER_ID_LEN, Snapshot, random_id,
};

use serde::{Deserialize, Serialize};

/// A catalogue child that could not be loaded as a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub path: String,
    pub code: String,
    pub message: String,
}
