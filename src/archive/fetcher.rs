//! Archive Fetcher
//!
//! Downloads whole archives over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// == Fetch Error ==
/// Failed download. `status` is set only when the server answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    fn transport(url: &str, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self {
            url: url.to_string(),
            status: None,
            message,
        }
    }
}

/// Source of raw archive bytes.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Downloads the archive at `url`. Implementations must not retry.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// == HTTP Fetcher ==
/// Single unauthenticated GET per archive with a bounded total timeout.
pub struct HttpArchiveFetcher {
    client: Client,
}

impl HttpArchiveFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        info!("Fetching archive from {}...", url);
        let started = Instant::now();

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP request failed with status: {}", status),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url, &e))?;

        info!(
            "Fetched {} bytes from {} in {} ms",
            body.len(),
            url,
            started.elapsed().as_millis()
        );

        Ok(body.to_vec())
    }
}
