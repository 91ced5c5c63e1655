//! Cache Record Module
//!
//! The fully extracted contents of one dataset's archive.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::archive::{ArchiveFileInfo, ExtractedArchive};

// == Cache Record ==
/// Immutable set of decoded entries for one dataset identifier.
///
/// Every entry is reachable under its stored path, and also under its
/// forward-slash form when that differs.
#[derive(Debug)]
pub struct CacheRecord {
    dataset: String,
    source_url: String,
    /// Entry key -> decoded content
    entries: HashMap<String, Arc<str>>,
    /// Distinct archive entries (aliases excluded)
    entry_count: usize,
    /// Non-directory files in the archive, for listings
    files: Vec<ArchiveFileInfo>,
    archive_size: u64,
    loaded_at: DateTime<Utc>,
}

impl CacheRecord {
    // == Constructor ==
    /// Builds a record from a finished extraction.
    ///
    /// Stored paths take precedence when a normalized alias collides with
    /// another entry's stored path.
    pub fn from_archive(dataset: &str, source_url: &str, archive: ExtractedArchive) -> Self {
        let entry_count = archive.entries.len();
        let mut entries = HashMap::with_capacity(entry_count * 2);
        let mut aliases = Vec::new();

        for entry in archive.entries {
            if entry.normalized_path != entry.original_path {
                aliases.push((entry.normalized_path, Arc::clone(&entry.content)));
            }
            entries.insert(entry.original_path, entry.content);
        }
        for (alias, content) in aliases {
            entries.entry(alias).or_insert(content);
        }

        Self {
            dataset: dataset.to_string(),
            source_url: source_url.to_string(),
            entries,
            entry_count,
            files: archive.files,
            archive_size: archive.archive_size,
            loaded_at: Utc::now(),
        }
    }

    /// Content stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Arc<str>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Number of distinct CSV entries extracted.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Number of lookup keys, aliases included.
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Up to `n` keys in sorted order, for log output.
    pub fn sample_keys(&self, n: usize) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys.truncate(n);
        keys
    }

    pub fn files(&self) -> &[ArchiveFileInfo] {
        &self.files
    }

    pub fn csv_file_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_csv).count()
    }

    pub fn archive_size(&self) -> u64 {
        self.archive_size
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
