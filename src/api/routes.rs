//! API route definitions

use crate::proxy::MirrorService;
use axum::{
    Router,
    routing::{any, get},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MirrorService>,
    pub prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

/// Create the main API router
///
/// Repositories without an organization use the shorter route forms.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Revision metadata
        .route(
            "/api/{repo_type}/{org}/{repo}/revision/{revision}",
            get(handlers::meta_get).head(handlers::meta_head),
        )
        .route(
            "/api/{repo_type}/{org}/revision/{revision}",
            get(handlers::meta_get).head(handlers::meta_head),
        )
        // Refs
        .route("/api/{repo_type}/{org}/{repo}/refs", get(handlers::repo_refs))
        .route("/api/{repo_type}/{org}/refs", get(handlers::repo_refs))
        // Cached directory listings
        .route(
            "/api/{repo_type}/{org}/{repo}/files/{commit}",
            get(handlers::list_files),
        )
        .route("/api/{repo_type}/{org}/files/{commit}", get(handlers::list_files))
        // Origin passthrough
        .route("/api/whoami-v2", any(handlers::forward_to_origin))
        .route("/api/repos/{*rest}", any(handlers::forward_to_origin))
        .fallback(handlers::forward_to_origin)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
