//! Snapshot and directory association models

use crate::io::snapshot::timestamp;
use crate::services::{fsops, size};
use crate::{Error, Result, SizeBasis};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTHOR: &str = "UnknownUser";

/// Length of the random id given to each directory association
pub const FOLDER_ID_LEN: usize = 4;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Generate a random alphanumeric identifier of `len` characters.
#[must_use]
pub fn random_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

/// One source directory bound into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAssociation {
    pub index: u32,
    pub original_path: String,
    pub folder_id: String,
}

impl DirectoryAssociation {
    #[must_use]
    pub fn new(index: u32, original_path: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            index,
            original_path: original_path.into(),
            folder_id: folder_id.into(),
        }
    }

    /// Pick a random subfolder of `source_root` and bind it under `index`.
    pub fn gen_random(source_root: &Path, index: u32) -> Result<Self> {
        let folder = fsops::random_subfolder(source_root)?.ok_or_else(|| {
            Error::InvalidInput(format!(
                "No subfolders to choose from in {}",
                source_root.display()
            ))
        })?;
        Ok(Self::new(
            index,
            folder.to_string_lossy(),
            random_id(FOLDER_ID_LEN),
        ))
    }

    /// Name of the copy stored inside the catalogue: `{index}-{basename}`
    #[must_use]
    pub fn directory_name(&self) -> String {
        format!("{}-{}", self.index, self.basename())
    }

    /// Leaf name of the original directory
    #[must_use]
    pub fn basename(&self) -> String {
        Path::new(&self.original_path)
            .file_name()
            .map_or_else(|| "dir".to_string(), |n| n.to_string_lossy().to_string())
    }

    /// Copy the source directory into `target_root/{directory_name}`.
    ///
    /// Returns the destination path. Fails if the source directory is gone.
    pub fn copy_install_to(&self, target_root: &Path) -> Result<PathBuf> {
        let source = Path::new(&self.original_path);
        if !source.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Source directory does not exist: {}", source.display()),
            )));
        }

        let destination = target_root.join(self.directory_name());
        log::debug!(
            "Copying {} -> {}",
            source.display(),
            destination.display()
        );
        fsops::copy_dir_contents(source, &destination)?;
        Ok(destination)
    }
}

/// A named, identified bundle of directory associations plus free-form data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub name: String,
    pub desc: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub directories: Vec<DirectoryAssociation>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now", with = "timestamp::required")]
    pub(crate) date_created: DateTime<Utc>,
    #[serde(default, with = "timestamp::optional")]
    pub(crate) date_modified: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub(crate) date_last_used: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::optional")]
    pub(crate) date_last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Snapshot {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            desc: desc.into(),
            author: default_author(),
            directories: Vec::new(),
            tags: Vec::new(),
            date_created: Utc::now(),
            date_modified: None,
            date_last_used: None,
            date_last_modified: None,
            data: BTreeMap::new(),
        }
    }

    /// Create a snapshot with a freshly generated id of `id_length` characters.
    #[must_use]
    pub fn with_random_id(id_length: usize, name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self::new(random_id(id_length), name, desc)
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self.add_tag(tag);
        }
        self
    }

    #[must_use]
    pub fn with_directories(mut self, directories: Vec<DirectoryAssociation>) -> Self {
        self.directories = directories;
        self
    }

    #[must_use]
    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    #[must_use]
    pub fn date_modified(&self) -> Option<DateTime<Utc>> {
        self.date_modified
    }

    #[must_use]
    pub fn date_last_used(&self) -> Option<DateTime<Utc>> {
        self.date_last_used
    }

    #[must_use]
    pub fn date_last_modified(&self) -> Option<DateTime<Utc>> {
        self.date_last_modified
    }

    // Tags

    /// Add a tag unless already present. Returns whether it was added.
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    // Data items

    pub fn add_data_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    /// Remove a key, returning its value or `None` if it was absent.
    pub fn remove_data_item(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    #[must_use]
    pub fn has_data_item(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    #[must_use]
    pub fn get_data_item(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_data_item_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_data_item(key).unwrap_or(default)
    }

    /// Replace the value of an existing key.
    ///
    /// # Errors
    /// `Error::MissingDataKey` when `key` is not present.
    pub fn edit_data_item(&mut self, key: &str, new_value: impl Into<String>) -> Result<()> {
        match self.data.get_mut(key) {
            Some(value) => {
                *value = new_value.into();
                Ok(())
            }
            None => Err(Error::MissingDataKey(key.to_string())),
        }
    }

    pub fn clear_all_data(&mut self) {
        self.data.clear();
    }

    // Directory associations

    /// Next ordinal for a new association: one past the highest index in use.
    #[must_use]
    pub fn next_dir_index(&self) -> u32 {
        self.directories
            .iter()
            .map(|d| d.index)
            .max()
            .map_or(1, |max| max + 1)
    }

    fn unique_folder_id(&self) -> String {
        loop {
            let candidate = random_id(FOLDER_ID_LEN);
            if self.find_directory(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Append an association for `path` with a fresh index and folder id.
    pub fn add_directory(&mut self, path: impl AsRef<Path>) -> &DirectoryAssociation {
        let assoc = DirectoryAssociation::new(
            self.next_dir_index(),
            path.as_ref().to_string_lossy(),
            self.unique_folder_id(),
        );
        self.directories.push(assoc);
        &self.directories[self.directories.len() - 1]
    }

    #[must_use]
    pub fn find_directory(&self, folder_id: &str) -> Option<&DirectoryAssociation> {
        self.directories.iter().find(|d| d.folder_id == folder_id)
    }

    /// Detach the association with `folder_id` from the model.
    pub fn remove_directory(&mut self, folder_id: &str) -> Option<DirectoryAssociation> {
        let pos = self
            .directories
            .iter()
            .position(|d| d.folder_id == folder_id)?;
        Some(self.directories.remove(pos))
    }

    /// Sum of the current sizes of all associated source directories.
    ///
    /// Walks each `original_path` live; missing directories count as zero.
    #[must_use]
    pub fn assoc_dir_size_bytes(&self, basis: SizeBasis) -> u64 {
        self.directories
            .iter()
            .map(|d| size::dir_size(Path::new(&d.original_path), basis))
            .sum()
    }

    /// Logical size of all associated source directories, in MB.
    #[must_use]
    pub fn get_assoc_dir_mb_size(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let bytes = self.assoc_dir_size_bytes(SizeBasis::Logical) as f64;
        bytes / BYTES_PER_MB
    }
}
