//! Response DTOs for the archive service API
//!
//! Defines the structure of outgoing JSON response bodies. Entry content
//! itself is returned as raw `text/csv`, and failures are rendered by
//! [`ArchiveError`](crate::error::ArchiveError).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheRecord, CacheStats};

/// Number of files included in an archive listing.
pub const LISTING_LIMIT: usize = 50;

/// One file in an archive listing.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    #[serde(rename = "isCSV")]
    pub is_csv: bool,
}

/// Response body for the archive listing (GET /api/debug/zip-contents)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub track: String,
    pub zip_url: String,
    pub total_files: usize,
    pub csv_files: usize,
    /// First [`LISTING_LIMIT`] files in archive order
    pub files: Vec<FileSummary>,
    pub loaded_at: DateTime<Utc>,
}

impl ListingResponse {
    pub fn from_record(record: &CacheRecord) -> Self {
        Self {
            track: record.dataset().to_string(),
            zip_url: record.source_url().to_string(),
            total_files: record.files().len(),
            csv_files: record.csv_file_count(),
            files: record
                .files()
                .iter()
                .take(LISTING_LIMIT)
                .map(|f| FileSummary {
                    name: f.name.clone(),
                    size: f.size,
                    is_csv: f.is_csv,
                })
                .collect(),
            loaded_at: record.loaded_at(),
        }
    }
}

/// One known dataset identifier.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub id: String,
    pub url: String,
    pub cached: bool,
}

/// Response body for the dataset catalogue (GET /api/datasets)
#[derive(Debug, Clone, Serialize)]
pub struct DatasetsResponse {
    pub datasets: Vec<DatasetSummary>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub load_failures: u64,
    pub evictions: u64,
    /// Datasets currently cached
    pub datasets: usize,
    /// Distinct entries across cached datasets
    pub entries: usize,
    /// Archive loads running right now
    pub loads_in_flight: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, loads_in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            loads: stats.loads,
            load_failures: stats.load_failures,
            evictions: stats.evictions,
            datasets: stats.datasets,
            entries: stats.entries,
            loads_in_flight,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
