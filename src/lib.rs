//! Track Archive - remote telemetry archive access
//!
//! Fetches ZIP archives of lap and telemetry data on first use, caches their
//! CSV entries in memory and serves them by loosely specified paths.

pub mod api;
pub mod archive;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use error::ArchiveError;
pub use service::EntryService;
