//! API Routes
//!
//! Configures the Axum router with all archive service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    datasets_handler, entry_handler, health_handler, listing_handler, missing_path_handler,
    stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/data/:dataset/*path` - CSV entry content
/// - `GET /api/debug/zip-contents?track=` - Archive listing
/// - `GET /api/datasets` - Known datasets and cache status
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/data/:dataset", get(missing_path_handler))
        .route("/api/data/:dataset/*path", get(entry_handler))
        .route("/api/debug/zip-contents", get(listing_handler))
        .route("/api/datasets", get(datasets_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveFetcher, ArchiveLocator, FetchError};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    struct Unreachable;

    #[async_trait]
    impl ArchiveFetcher for Unreachable {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError {
                url: url.to_string(),
                status: None,
                message: "connection refused".to_string(),
            })
        }
    }

    fn create_test_app() -> Router {
        let state = AppState::with_fetcher(
            ArchiveLocator::new([("barber", "mem://barber.zip")]),
            Arc::new(Unreachable),
            0,
        );
        create_router(state)
    }

    async fn get_status(uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(get_status("/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        assert_eq!(get_status("/stats").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_datasets_endpoint() {
        assert_eq!(get_status("/api/datasets").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_dataset() {
        assert_eq!(
            get_status("/api/data/monaco/lap.csv").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_missing_file_path() {
        assert_eq!(get_status("/api/data/barber").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        assert_eq!(
            get_status("/api/data/barber/lap.csv").await,
            StatusCode::BAD_GATEWAY
        );
    }
}
