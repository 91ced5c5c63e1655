//! API Handlers
//!
//! HTTP request handlers for each archive service endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::archive::{ArchiveFetcher, ArchiveLocator, HttpArchiveFetcher};
use crate::cache::ArchiveStore;
use crate::config::Config;
use crate::error::{ArchiveError, Result};
use crate::models::{
    DatasetSummary, DatasetsResponse, HealthResponse, ListingQuery, ListingResponse,
    StatsResponse,
};
use crate::service::EntryService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EntryService>,
}

impl AppState {
    pub fn new(service: EntryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Wires the store, locator and fetcher into a service.
    pub fn with_fetcher(
        locator: ArchiveLocator,
        fetcher: Arc<dyn ArchiveFetcher>,
        max_cached_datasets: usize,
    ) -> Self {
        let store = Arc::new(RwLock::new(ArchiveStore::new(max_cached_datasets)));
        Self::new(EntryService::new(locator, fetcher, store))
    }

    /// Creates a new AppState from configuration, fetching over HTTP.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpArchiveFetcher::new(config.fetch_timeout())
            .map_err(|e| ArchiveError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_fetcher(
            ArchiveLocator::with_base_url(&config.archive_base_url),
            Arc::new(fetcher),
            config.max_cached_datasets,
        ))
    }
}

/// Handler for GET /api/data/:dataset/*path
///
/// Returns the CSV entry as `text/csv`.
pub async fn entry_handler(
    State(state): State<AppState>,
    Path((dataset, path)): Path<(String, String)>,
) -> Result<Response> {
    let path = path.trim_start_matches('/');
    info!("Requested: track={}, path={}", dataset, path);

    let content = state.service.get_entry(&dataset, path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        content.to_string(),
    )
        .into_response())
}

/// Handler for GET /api/data/:dataset
///
/// A dataset without a file path is not a valid request.
pub async fn missing_path_handler(Path(_dataset): Path<String>) -> Result<Response> {
    Err(ArchiveError::InvalidRequest("Invalid path".to_string()))
}

/// Handler for GET /api/debug/zip-contents?track=
///
/// Lists the archive's files, loading it on first use.
pub async fn listing_handler(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>> {
    let record = state.service.record(query.track()).await?;
    Ok(Json(ListingResponse::from_record(&record)))
}

/// Handler for GET /api/datasets
pub async fn datasets_handler(State(state): State<AppState>) -> Json<DatasetsResponse> {
    let store = state.service.store().read().await;
    let locator = state.service.locator();

    let datasets = locator
        .datasets()
        .into_iter()
        .filter_map(|id| {
            let url = locator.locate(id).ok()?;
            Some(DatasetSummary {
                id: id.to_string(),
                url: url.to_string(),
                cached: store.contains(id),
            })
        })
        .collect();

    Json(DatasetsResponse { datasets })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.store().read().await.stats();
    Json(StatsResponse::new(&stats, state.service.loads_in_flight()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
