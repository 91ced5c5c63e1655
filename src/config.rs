//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::archive::DEFAULT_BASE_URL;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL the track archives are downloaded from
    pub archive_base_url: String,
    /// Total time allowed for one archive download, in seconds
    pub fetch_timeout_secs: u64,
    /// Maximum datasets kept in memory; 0 keeps everything
    pub max_cached_datasets: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ARCHIVE_BASE_URL` - Archive host (default: https://trddev.com/hackathon-2025)
    /// - `FETCH_TIMEOUT_SECS` - Download timeout in seconds (default: 60)
    /// - `MAX_CACHED_DATASETS` - LRU bound on cached datasets (default: 0, unbounded)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            archive_base_url: env::var("ARCHIVE_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.archive_base_url),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.fetch_timeout_secs),
            max_cached_datasets: parse_var("MAX_CACHED_DATASETS")
                .unwrap_or(defaults.max_cached_datasets),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            archive_base_url: DEFAULT_BASE_URL.to_string(),
            fetch_timeout_secs: 60,
            max_cached_datasets: 0,
        }
    }
}
