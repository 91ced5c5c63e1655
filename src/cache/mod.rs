//! Cache Module
//!
//! In-memory cache of extracted archives, keyed by dataset identifier.
//! Records live for the whole process unless LRU eviction is enabled.

mod coalesce;
mod lru;
mod record;
mod stats;
mod store;


// Re-export public types
pub use coalesce::LoadCoalescer;
pub use lru::LruTracker;
pub use record::CacheRecord;
pub use stats::CacheStats;
pub use store::ArchiveStore;
