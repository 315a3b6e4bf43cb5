//! Human-readable formatting of sizes and timestamps

use chrono::{DateTime, Local, Utc};

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Format a byte count with binary units, e.g. `1.5 MiB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Local-time rendering for listings, `-` when absent.
#[must_use]
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || "-".to_string(),
        |d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}
