//! API Module
//!
//! HTTP handlers and routing for the archive service.
//!
//! # Endpoints
//! - `GET /api/data/:dataset/*path` - CSV entry content
//! - `GET /api/debug/zip-contents?track=` - Archive listing
//! - `GET /api/datasets` - Known datasets and cache status
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
