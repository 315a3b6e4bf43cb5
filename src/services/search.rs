//! Line-oriented text and regex search over the stored contents of snapshots

use crate::Result;
use crate::models::{SearchMode, SearchParams, SearchProgress, Snapshot, SnapshotSearchResult};
use crate::services::catalogue::SnapshotCatalogue;
use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

enum Matcher {
    Text { needle: String, case_sensitive: bool },
    Pattern(Regex),
}

impl Matcher {
    /// `None` for an unusable regex; the search then yields nothing.
    fn from_params(params: &SearchParams) -> Option<Self> {
        match params.mode {
            SearchMode::Text => Some(Matcher::Text {
                needle: if params.case_sensitive {
                    params.query.clone()
                } else {
                    params.query.to_lowercase()
                },
                case_sensitive: params.case_sensitive,
            }),
            SearchMode::Regex => match RegexBuilder::new(&params.query)
                .case_insensitive(!params.case_sensitive)
                .build()
            {
                Ok(re) => Some(Matcher::Pattern(re)),
                Err(e) => {
                    log::warn!("Invalid search pattern '{}': {e}", params.query);
                    None
                }
            },
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Text {
                needle,
                case_sensitive: true,
            } => line.contains(needle.as_str()),
            Matcher::Text { needle, .. } => line.to_lowercase().contains(needle.as_str()),
            Matcher::Pattern(re) => re.is_match(line),
        }
    }
}

pub struct SnapshotSearcher<'a> {
    catalogue: &'a SnapshotCatalogue,
}

impl<'a> SnapshotSearcher<'a> {
    #[must_use]
    pub fn new(catalogue: &'a SnapshotCatalogue) -> Self {
        Self { catalogue }
    }

    /// Regular files of every stored directory of `snapshot`, filtered by extension.
    fn collect_files(&self, snapshot: &Snapshot, params: &SearchParams) -> Vec<PathBuf> {
        let snapshot_dir = self.catalogue.snapshot_path(&snapshot.id);
        let mut files = Vec::new();

        for assoc in &snapshot.directories {
            let root = snapshot_dir.join(assoc.directory_name());
            if !root.is_dir() {
                log::warn!(
                    "Snapshot {} has no stored copy at {}",
                    snapshot.id,
                    root.display()
                );
                continue;
            }
            for entry in WalkDir::new(&root).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        if params.matches_extension(entry.path()) {
                            files.push(entry.into_path());
                        } else {
                            log::trace!("Extension filter skipped {}", entry.path().display());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Search walk error under {}: {e}", root.display()),
                }
            }
        }
        files
    }

    fn search_file(
        snapshot: &Snapshot,
        params: &SearchParams,
        matcher: &Matcher,
        path: &Path,
    ) -> Vec<SnapshotSearchResult> {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Cannot read {}: {e}", path.display());
                return Vec::new();
            }
        };
        let Ok(text) = String::from_utf8(bytes) else {
            log::trace!("Not UTF-8 text, skipped: {}", path.display());
            return Vec::new();
        };

        let file_path = path.to_string_lossy().to_string();
        text.lines()
            .enumerate()
            .filter(|(_, line)| matcher.is_match(line))
            .map(|(i, line)| SnapshotSearchResult {
                snapshot_id: snapshot.id.clone(),
                snapshot_name: snapshot.name.clone(),
                file_path: file_path.clone(),
                line_number: i + 1,
                searched_text: params.query.clone(),
                line_content: line.to_string(),
            })
            .collect()
    }

    fn search_with_matcher<F: FnMut(&SearchProgress)>(
        &self,
        snapshot: &Snapshot,
        params: &SearchParams,
        matcher: &Matcher,
        on_progress: &mut F,
    ) -> Vec<SnapshotSearchResult> {
        let files = self.collect_files(snapshot, params);
        let total_files = files.len();
        log::debug!("Searching {total_files} file(s) of snapshot {}", snapshot.id);

        let mut results = Vec::new();
        for (i, path) in files.iter().enumerate() {
            on_progress(&SearchProgress {
                current_file: path.clone(),
                total_files,
                current_index: i + 1,
            });
            results.extend(Self::search_file(snapshot, params, matcher, path));
        }
        results
    }

    /// Every matching line in the stored contents of `snapshot`.
    #[must_use]
    pub fn search(&self, snapshot: &Snapshot, params: &SearchParams) -> Vec<SnapshotSearchResult> {
        self.search_with_progress(snapshot, params, |_| {})
    }

    /// Like [`Self::search`], calling `on_progress` once per file before it is read.
    pub fn search_with_progress<F: FnMut(&SearchProgress)>(
        &self,
        snapshot: &Snapshot,
        params: &SearchParams,
        mut on_progress: F,
    ) -> Vec<SnapshotSearchResult> {
        let Some(matcher) = Matcher::from_params(params) else {
            return Vec::new();
        };
        self.search_with_matcher(snapshot, params, &matcher, &mut on_progress)
    }

    /// Search several snapshots, concatenating results in the given order.
    #[must_use]
    pub fn search_list(&self, snapshots: &[Snapshot], params: &SearchParams) -> Vec<SnapshotSearchResult> {
        self.search_list_with_progress(snapshots, params, |_| {})
    }

    pub fn search_list_with_progress<F: FnMut(&SearchProgress)>(
        &self,
        snapshots: &[Snapshot],
        params: &SearchParams,
        mut on_progress: F,
    ) -> Vec<SnapshotSearchResult> {
        let Some(matcher) = Matcher::from_params(params) else {
            return Vec::new();
        };
        snapshots
            .iter()
            .flat_map(|s| self.search_with_matcher(s, params, &matcher, &mut on_progress))
            .collect()
    }

    /// Plain substring search over the whole catalogue.
    pub fn search_text(&self, query: &str) -> Result<Vec<SnapshotSearchResult>> {
        let snapshots = self.catalogue.get_all()?;
        Ok(self.search_list(&snapshots, &SearchParams::text(query)))
    }

    /// Regex search over the whole catalogue.
    pub fn search_regex(&self, pattern: &str) -> Result<Vec<SnapshotSearchResult>> {
        let snapshots = self.catalogue.get_all()?;
        Ok(self.search_list(&snapshots, &SearchParams::regex(pattern)))
    }
}
