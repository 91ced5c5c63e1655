//! Entry Service
//!
//! Answers "contents of file F for dataset D": loads the dataset's archive on
//! first use, then serves every request from the cache.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::archive::{extract, ArchiveFetcher, ArchiveLocator, ExtractedArchive};
use crate::cache::{ArchiveStore, CacheRecord, LoadCoalescer};
use crate::error::{ArchiveError, Result};
use crate::resolver;

// == Entry Service ==
pub struct EntryService {
    locator: Arc<ArchiveLocator>,
    fetcher: Arc<dyn ArchiveFetcher>,
    store: Arc<RwLock<ArchiveStore>>,
    coalescer: LoadCoalescer,
}

impl EntryService {
    pub fn new(
        locator: ArchiveLocator,
        fetcher: Arc<dyn ArchiveFetcher>,
        store: Arc<RwLock<ArchiveStore>>,
    ) -> Self {
        Self {
            locator: Arc::new(locator),
            fetcher,
            store,
            coalescer: LoadCoalescer::new(),
        }
    }

    pub fn locator(&self) -> &ArchiveLocator {
        &self.locator
    }

    pub fn store(&self) -> &Arc<RwLock<ArchiveStore>> {
        &self.store
    }

    /// Archive loads currently running.
    pub fn loads_in_flight(&self) -> usize {
        self.coalescer.in_flight()
    }

    // == Get Entry ==
    /// Returns the content of `relative_path` within `dataset`.
    ///
    /// Every candidate key is probed in order and the first hit wins. When
    /// none match, the error lists all of them.
    pub async fn get_entry(&self, dataset: &str, relative_path: &str) -> Result<Arc<str>> {
        if dataset.is_empty() || relative_path.is_empty() {
            return Err(ArchiveError::InvalidRequest("Invalid path".to_string()));
        }

        let record = self.record(dataset).await?;
        let tried = resolver::candidates(dataset, relative_path);

        if let Some(content) = probe(&record, &tried) {
            return Ok(content);
        }

        // Callers sometimes include the dataset folder the archive lacks
        if let Some(stripped) = resolver::strip_dataset_prefix(dataset, relative_path) {
            if let Some(content) = probe(&record, &resolver::candidates(dataset, stripped)) {
                return Ok(content);
            }
        }

        warn!(
            "File not found in {}: {} (tried {:?})",
            dataset, relative_path, tried
        );
        Err(ArchiveError::EntryNotFound {
            dataset: dataset.to_string(),
            requested_path: relative_path.to_string(),
            tried,
        })
    }

    // == Record ==
    /// Returns the cached record for `dataset`, loading the archive on a miss.
    ///
    /// Concurrent misses for one dataset share a single fetch and extract.
    pub async fn record(&self, dataset: &str) -> Result<Arc<CacheRecord>> {
        if let Some(record) = self.store.write().await.record(dataset) {
            debug!("Cache hit for {}", dataset);
            return Ok(record);
        }

        let url = self.locator.locate(dataset)?.to_string();
        let load = load_archive(
            dataset.to_string(),
            url,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.store),
        );

        self.coalescer.load(dataset, load).await
    }
}

/// Fetches, extracts and publishes one archive.
///
/// Re-checks the store first so a request that missed just before another
/// load finished does not download again.
async fn load_archive(
    dataset: String,
    url: String,
    fetcher: Arc<dyn ArchiveFetcher>,
    store: Arc<RwLock<ArchiveStore>>,
) -> Result<Arc<CacheRecord>> {
    if let Some(record) = store.read().await.peek(&dataset) {
        return Ok(record);
    }

    match fetch_and_extract(&dataset, &url, fetcher.as_ref()).await {
        Ok(archive) => {
            let record = store.write().await.populate(&dataset, &url, archive);
            info!(
                "Cached {} CSV files for {}; sample paths: {:?}",
                record.entry_count(),
                dataset,
                record.sample_keys(5)
            );
            Ok(record)
        }
        Err(err) => {
            error!("Error processing archive for {}: {}", dataset, err);
            store.write().await.record_load_failure();
            Err(err)
        }
    }
}

/// First candidate key present in the record.
fn probe(record: &CacheRecord, keys: &[String]) -> Option<Arc<str>> {
    keys.iter().find_map(|key| {
        let content = record.get(key)?;
        debug!("Found file at path: {}", key);
        Some(Arc::clone(content))
    })
}

async fn fetch_and_extract(
    dataset: &str,
    url: &str,
    fetcher: &dyn ArchiveFetcher,
) -> Result<ExtractedArchive> {
    let bytes = fetcher
        .fetch(url)
        .await
        .map_err(|e| ArchiveError::fetch(dataset, e))?;

    let archive = tokio::task::spawn_blocking(move || extract(&bytes))
        .await
        .map_err(|e| ArchiveError::Internal(format!("extraction task failed: {}", e)))?
        .map_err(|e| ArchiveError::extract(dataset, e))?;

    info!(
        "Extracted {} CSV entries from {} files for {} ({} skipped)",
        archive.entries.len(),
        archive.files.len(),
        dataset,
        archive.skipped
    );

    Ok(archive)
}
