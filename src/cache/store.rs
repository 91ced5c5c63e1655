//! Archive Store Module
//!
//! Dataset identifier -> cache record map with optional LRU eviction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::archive::ExtractedArchive;
use crate::cache::{CacheRecord, CacheStats, LruTracker};

// == Archive Store ==
/// Process-lifetime cache of extracted archives.
///
/// Constructed once at startup and shared behind `Arc<RwLock<_>>`. Records
/// are built completely before insertion, so a reader holding the lock sees
/// either no record for a dataset or the full one.
#[derive(Debug)]
pub struct ArchiveStore {
    /// Dataset identifier -> extracted record
    records: HashMap<String, Arc<CacheRecord>>,
    /// Recency across datasets
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum resident datasets, 0 = unbounded
    max_datasets: usize,
}

impl ArchiveStore {
    // == Constructor ==
    /// Creates an empty store. `max_datasets == 0` disables eviction.
    pub fn new(max_datasets: usize) -> Self {
        Self {
            records: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_datasets,
        }
    }

    // == Record ==
    /// Returns the record for `dataset`, counting a hit or miss.
    pub fn record(&mut self, dataset: &str) -> Option<Arc<CacheRecord>> {
        match self.records.get(dataset) {
            Some(record) => {
                let record = Arc::clone(record);
                self.stats.record_hit();
                self.lru.touch(dataset);
                Some(record)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Peek ==
    /// Returns the record for `dataset` without touching stats or recency.
    pub fn peek(&self, dataset: &str) -> Option<Arc<CacheRecord>> {
        self.records.get(dataset).cloned()
    }

    // == Get ==
    /// Content of one entry key within a dataset, or `None` on a miss.
    pub fn get(&mut self, dataset: &str, key: &str) -> Option<Arc<str>> {
        self.record(dataset)?.get(key).cloned()
    }

    // == Populate ==
    /// Publishes the extracted archive for `dataset`.
    ///
    /// The record is fully built before it becomes visible. An existing record
    /// is never replaced; it is returned instead.
    pub fn populate(
        &mut self,
        dataset: &str,
        source_url: &str,
        archive: ExtractedArchive,
    ) -> Arc<CacheRecord> {
        if let Some(existing) = self.records.get(dataset) {
            return Arc::clone(existing);
        }

        let record = Arc::new(CacheRecord::from_archive(dataset, source_url, archive));

        if self.max_datasets > 0 {
            while self.records.len() >= self.max_datasets {
                let Some(evicted) = self.lru.evict_oldest() else {
                    break;
                };
                if self.records.remove(&evicted).is_some() {
                    info!("Evicted cached archive for {}", evicted);
                    self.stats.record_eviction();
                }
            }
        }

        self.records
            .insert(dataset.to_string(), Arc::clone(&record));
        self.lru.touch(dataset);
        self.stats.record_load();
        self.refresh_resident();

        record
    }

    /// Counts a fetch or extract failure. The records are left untouched.
    pub fn record_load_failure(&mut self) {
        self.stats.record_load_failure();
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.records.contains_key(dataset)
    }

    /// Cached dataset identifiers, sorted.
    pub fn datasets(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn refresh_resident(&mut self) {
        let entries = self.records.values().map(|r| r.entry_count()).sum();
        self.stats.set_resident(self.records.len(), entries);
    }
}

impl Default for ArchiveStore {
    fn default() -> Self {
        Self::new(0)
    }
}
