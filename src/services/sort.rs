//! Snapshot ordering

use crate::models::Snapshot;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Sort snapshots by a specified field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Case-insensitive name
    Name,
    DateCreated,
    /// Snapshots never modified sort first
    DateModified,
    /// Live size of the associated source directories
    AssocDirMbSize,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Ok(SortBy::Name),
            "created" | "date_created" => Ok(SortBy::DateCreated),
            "modified" | "date_modified" => Ok(SortBy::DateModified),
            "size" | "assoc_dir_mb_size" => Ok(SortBy::AssocDirMbSize),
            other => Err(format!(
                "Invalid sort: {other}. Use 'name', 'created', 'modified' or 'size'"
            )),
        }
    }
}

/// Stable sort; ties keep their input order in both directions.
pub fn sort_snapshots(snapshots: &mut Vec<Snapshot>, sort_by: SortBy, reverse: bool) {
    let directed = |ord: Ordering| if reverse { ord.reverse() } else { ord };

    match sort_by {
        SortBy::Name => {
            snapshots.sort_by(|a, b| directed(a.name.to_lowercase().cmp(&b.name.to_lowercase())));
        }
        SortBy::DateCreated => {
            snapshots.sort_by(|a, b| directed(a.date_created().cmp(&b.date_created())));
        }
        SortBy::DateModified => {
            snapshots.sort_by(|a, b| directed(a.date_modified().cmp(&b.date_modified())));
        }
        SortBy::AssocDirMbSize => {
            // sizes walk the filesystem, compute them once and in parallel
            let sizes: Vec<f64> = snapshots
                .par_iter()
                .map(Snapshot::get_assoc_dir_mb_size)
                .collect();
            let mut keyed: Vec<(f64, Snapshot)> = sizes.into_iter().zip(snapshots.drain(..)).collect();
            keyed.sort_by(|a, b| directed(a.0.total_cmp(&b.0)));
            snapshots.extend(keyed.into_iter().map(|(_, s)| s));
        }
    }
}
