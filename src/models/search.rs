//! Search parameters, results and progress events

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    /// Plain substring match
    #[default]
    Text,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    pub mode: SearchMode,
    /// Lower-cased extensions without the leading dot; empty means every file
    pub extensions: Vec<String>,
    pub case_sensitive: bool,
}

impl SearchParams {
    #[must_use]
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            mode: SearchMode::Text,
            extensions: Vec::new(),
            case_sensitive: true,
        }
    }

    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            mode: SearchMode::Regex,
            ..Self::text(pattern)
        }
    }

    /// Restrict the search to files with these extensions (`"txt"` or `".txt"`).
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Whether `path` passes the extension filter.
    #[must_use]
    pub fn matches_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSearchResult {
    pub snapshot_id: String,
    pub snapshot_name: String,
    pub file_path: String,
    /// 1-based
    pub line_number: usize,
    pub searched_text: String,
    pub line_content: String,
}

/// Emitted once per file visited during a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub current_file: PathBuf,
    pub total_files: usize,
    /// 1-based position of `current_file`
    pub current_index: usize,
}
