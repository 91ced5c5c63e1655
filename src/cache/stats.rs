//! Cache Statistics Module
//!
//! Tracks record lookups, archive loads and evictions.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that found a cached record
    pub hits: u64,
    /// Lookups that found no record
    pub misses: u64,
    /// Archives fetched, extracted and published
    pub loads: u64,
    /// Fetch or extract attempts that failed
    pub load_failures: u64,
    /// Records dropped by the LRU policy
    pub evictions: u64,
    /// Records currently resident
    pub datasets: usize,
    /// Distinct entries across resident records
    pub entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn set_resident(&mut self, datasets: usize, entries: usize) {
        self.datasets = datasets;
        self.entries = entries;
    }
}
