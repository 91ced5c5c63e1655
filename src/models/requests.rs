//! Request DTOs for the archive service API
//!
//! Defines the query parameters accepted by the HTTP endpoints.

use serde::Deserialize;

/// Dataset listed when no `track` parameter is given.
pub const DEFAULT_LISTING_TRACK: &str = "barber";

/// Query string for the archive listing (GET /api/debug/zip-contents)
///
/// # Fields
/// - `track`: dataset identifier to list (defaults to `barber`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub track: Option<String>,
}

impl ListingQuery {
    /// The requested track, or the default when absent or blank.
    pub fn track(&self) -> &str {
        match self.track.as_deref() {
            Some(track) if !track.trim().is_empty() => track,
            _ => DEFAULT_LISTING_TRACK,
        }
    }
}
