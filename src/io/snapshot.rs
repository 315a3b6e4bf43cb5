//! Snapshot JSON read/write operations
//!
//! A snapshot is persisted as a single pretty-printed JSON document. Whole-document
//! writes go through a temporary file and an atomic rename; targeted updates patch
//! individual top-level keys of the stored document without rebuilding the typed model.

use crate::models::Snapshot;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `snapshot` to `path`, replacing any previous content.
pub fn to_json(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = to_pretty_bytes(snapshot)?;
    write_atomic(path, &bytes)
}

/// Read a snapshot from `path`.
pub fn from_json(path: &Path) -> Result<Snapshot> {
    let text = fs::read_to_string(path)?;
    parse_snapshot(&text).map_err(|e| match e {
        Error::Serialization(msg) => Error::Serialization(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Parse a snapshot from JSON text.
pub fn parse_snapshot(text: &str) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(text)?;
    Ok(snapshot)
}

/// Replace one top-level field of the stored document.
pub fn update_field(path: &Path, field_name: &str, new_value: Value) -> Result<()> {
    update_fields(path, vec![(field_name, new_value)])
}

/// Replace several top-level fields with a single read and rewrite.
///
/// Keys not named in `patches` are written back untouched, including ones the
/// typed model does not know about.
pub fn update_fields(path: &Path, patches: Vec<(&str, Value)>) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let mut document: Map<String, Value> = serde_json::from_str(&text).map_err(|e| {
        Error::Serialization(format!("{}: not a JSON object: {e}", path.display()))
    })?;

    for (field_name, value) in patches {
        log::trace!("Patching '{field_name}' in {}", path.display());
        document.insert(field_name.to_string(), value);
    }

    let bytes = to_pretty_bytes(&document)?;
    write_atomic(path, &bytes)
}

fn to_pretty_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);
    {
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// ISO-8601 timestamp encoding for snapshot dates
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde_json::Value;

    /// RFC 3339 with as many fractional digits as needed.
    #[must_use]
    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// JSON value for a nullable timestamp.
    #[must_use]
    pub fn to_value(dt: Option<&DateTime<Utc>>) -> Value {
        dt.map_or(Value::Null, |d| Value::String(format(d)))
    }

    /// Parse RFC 3339, or a naive ISO-8601 string interpreted in local time.
    pub fn parse(s: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|e| format!("malformed timestamp '{s}': {e}"))?;

        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| format!("timestamp '{s}' does not exist in the local time zone"))
    }

    pub mod required {
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&super::format(dt))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
            let raw = String::deserialize(d)?;
            super::parse(&raw).map_err(D::Error::custom)
        }
    }

    pub mod optional {
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&super::format(dt)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.map(|s| super::parse(&s).map_err(D::Error::custom))
                .transpose()
        }
    }
}
