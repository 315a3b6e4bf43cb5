//! Output formatting for CLI

use crate::models::{SkippedEntry, Snapshot, SnapshotSearchResult};
use crate::services::format::{format_date, format_size};
use crate::SizeBasis;

const NAME_WIDTH: usize = 32;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Table of snapshots, one per line
pub fn format_list_text(snapshots: &[Snapshot], skipped: &[SkippedEntry]) {
    if snapshots.is_empty() {
        println!("No snapshots found.");
    } else {
        println!(
            "{:<12} {:<w$} {:>5} {:<16} {:<16}",
            "ID",
            "Name",
            "Dirs",
            "Created",
            "Modified",
            w = NAME_WIDTH
        );
        println!("{}", "-".repeat(12 + NAME_WIDTH + 5 + 16 + 16 + 4));
        for s in snapshots {
            println!(
                "{:<12} {:<w$} {:>5} {:<16} {:<16}",
                s.id,
                truncate(&s.name, NAME_WIDTH),
                s.directories.len(),
                format_date(Some(s.date_created())),
                format_date(s.date_modified()),
                w = NAME_WIDTH
            );
        }
    }

    if !skipped.is_empty() {
        eprintln!();
        eprintln!("Skipped {} catalogue entries:", skipped.len());
        for entry in skipped.iter().take(5) {
            eprintln!("  {} [{}]: {}", entry.path, entry.code, entry.message);
        }
        if skipped.len() > 5 {
            eprintln!("  ... and {} more", skipped.len() - 5);
        }
    }
}

/// Full description of one snapshot
pub fn format_snapshot_text(snapshot: &Snapshot) {
    println!("{} ({})", snapshot.name, snapshot.id);
    if !snapshot.desc.is_empty() {
        println!("  {}", snapshot.desc);
    }
    println!();
    println!("Author:        {}", snapshot.author);
    println!("Created:       {}", format_date(Some(snapshot.date_created())));
    println!("Modified:      {}", format_date(snapshot.date_modified()));
    println!("Last used:     {}", format_date(snapshot.date_last_used()));
    println!("Data modified: {}", format_date(snapshot.date_last_modified()));
    if !snapshot.tags.is_empty() {
        println!("Tags:          {}", snapshot.tags.join(", "));
    }
    println!(
        "Source size:   {}",
        format_size(snapshot.assoc_dir_size_bytes(SizeBasis::Logical))
    );

    println!();
    println!("Directories ({}):", snapshot.directories.len());
    for d in &snapshot.directories {
        println!("  {:<24} {}", d.directory_name(), d.original_path);
    }

    if !snapshot.data.is_empty() {
        println!();
        println!("Data:");
        for (key, value) in &snapshot.data {
            println!("  {key} = {value}");
        }
    }
}

/// Matches grouped under their file path
pub fn format_search_text(results: &[SnapshotSearchResult]) {
    if results.is_empty() {
        println!("No matches found.");
        return;
    }

    let mut current: Option<(&str, &str)> = None;
    for r in results {
        let key = (r.snapshot_id.as_str(), r.file_path.as_str());
        if current != Some(key) {
            println!("{} [{}] {}", r.snapshot_name, r.snapshot_id, r.file_path);
            current = Some(key);
        }
        println!("  {:>5}: {}", r.line_number, r.line_content);
    }
    println!();
    println!("{} match(es)", results.len());
}

/// Snapshot list as JSON
pub fn format_list_json(snapshots: &[Snapshot], skipped: &[SkippedEntry]) -> String {
    let output = serde_json::json!({
        "snapshots": snapshots,
        "skipped_count": skipped.len(),
        "skipped": if skipped.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::json!(skipped)
        }
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_snapshot_json(snapshot: &Snapshot) -> String {
    serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_search_json(results: &[SnapshotSearchResult]) -> String {
    let output = serde_json::json!({
        "match_count": results.len(),
        "matches": results,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
