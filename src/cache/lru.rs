//! LRU Tracker Module
//!
//! Recency ordering across dataset identifiers for optional eviction.

use std::collections::HashMap;

// == LRU Tracker ==
/// Tracks when each dataset was last used.
///
/// Every touch stamps the dataset with a monotonically increasing tick; the
/// smallest tick is the least recently used. Eviction scans all tracked
/// datasets, which stays cheap because a process only ever holds a handful.
#[derive(Debug, Default)]
pub struct LruTracker {
    clock: u64,
    last_used: HashMap<String, u64>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `dataset` as most recently used.
    pub fn touch(&mut self, dataset: &str) {
        self.clock += 1;
        match self.last_used.get_mut(dataset) {
            Some(tick) => *tick = self.clock,
            None => {
                self.last_used.insert(dataset.to_string(), self.clock);
            }
        }
    }

    /// Stops tracking `dataset`.
    pub fn remove(&mut self, dataset: &str) {
        self.last_used.remove(dataset);
    }

    /// Least recently used dataset, if any.
    pub fn least_recent(&self) -> Option<&str> {
        self.last_used
            .iter()
            .min_by_key(|(_, tick)| **tick)
            .map(|(dataset, _)| dataset.as_str())
    }

    /// Removes and returns the least recently used dataset.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let oldest = self.least_recent()?.to_string();
        self.last_used.remove(&oldest);
        Some(oldest)
    }

    pub fn len(&self) -> usize {
        self.last_used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_used.is_empty()
    }

    pub fn contains(&self, dataset: &str) -> bool {
        self.last_used.contains_key(dataset)
    }
}
