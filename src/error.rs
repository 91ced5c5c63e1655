//! Error types for the archive service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::archive::{FetchError, ZipError};

// == Archive Error Enum ==
/// Unified error type for the archive service.
///
/// `Clone` so a single load outcome can be handed to every coalesced waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Dataset identifier has no entry in the locator table
    #[error("Unknown dataset: {dataset}")]
    DatasetUnknown { dataset: String },

    /// Network or HTTP failure while downloading the archive
    #[error("Failed to fetch archive for {dataset} from {url}: {message}")]
    Fetch {
        dataset: String,
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Archive bytes could not be parsed
    #[error("Failed to extract archive for {dataset}: {message}")]
    Extract { dataset: String, message: String },

    /// Archive loaded but no candidate key matched
    #[error("File not found: {requested_path} in {dataset}")]
    EntryNotFound {
        dataset: String,
        requested_path: String,
        tried: Vec<String>,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ArchiveError {
    /// Wraps a fetcher failure with the dataset it was loading.
    pub fn fetch(dataset: &str, err: FetchError) -> Self {
        ArchiveError::Fetch {
            dataset: dataset.to_string(),
            url: err.url,
            status: err.status,
            message: err.message,
        }
    }

    /// Wraps an extractor failure with the dataset it was loading.
    pub fn extract(dataset: &str, err: ZipError) -> Self {
        ArchiveError::Extract {
            dataset: dataset.to_string(),
            message: err.to_string(),
        }
    }

    /// Short machine-readable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            ArchiveError::DatasetUnknown { .. } => "dataset_unknown",
            ArchiveError::Fetch { .. } => "fetch_error",
            ArchiveError::Extract { .. } => "extract_error",
            ArchiveError::EntryNotFound { .. } => "entry_not_found",
            ArchiveError::InvalidRequest(_) => "invalid_request",
            ArchiveError::Internal(_) => "internal_error",
        }
    }

    /// Whether a later request may succeed without the remote content changing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArchiveError::Fetch { .. })
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ArchiveError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, body) = match &self {
            ArchiveError::DatasetUnknown { dataset } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Unknown dataset",
                    "kind": kind,
                    "track": dataset,
                }),
            ),
            ArchiveError::Fetch {
                dataset,
                url,
                status,
                message,
            } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Failed to fetch archive",
                    "kind": kind,
                    "track": dataset,
                    "url": url,
                    "status": status,
                    "details": message,
                    "retryable": true,
                }),
            ),
            ArchiveError::Extract { dataset, message } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Failed to extract archive",
                    "kind": kind,
                    "track": dataset,
                    "details": message,
                    "retryable": false,
                }),
            ),
            ArchiveError::EntryNotFound {
                dataset,
                requested_path,
                tried,
            } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "File not found",
                    "kind": kind,
                    "track": dataset,
                    "requestedPath": requested_path,
                    "triedPaths": tried,
                }),
            ),
            ArchiveError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg, "kind": kind }),
            ),
            ArchiveError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "kind": kind, "details": msg }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the archive service.
pub type Result<T> = std::result::Result<T, ArchiveError>;
