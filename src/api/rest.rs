//! REST API router and configuration.

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers::{
    effective_tags_handler, health_handler, ingest_handler, list_grants_handler, metrics_handler,
    tags_handler, ApiState,
};
use crate::service::GrantService;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct RestApiConfig {
    /// Enable CORS.
    pub enable_cors: bool,
    /// API prefix (e.g., "/api").
    pub prefix: String,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            prefix: "/api".to_string(),
        }
    }
}

/// Create the REST API router.
///
/// Endpoints:
/// - GET  /api/health         - Liveness probe
/// - GET  /api/tags           - Canonical tags and synonyms
/// - GET  /api/tags/effective - Preview tag expansion
/// - POST /api/grants         - Ingest one grant or a batch
/// - GET  /api/grants?tags=.. - List grants, optionally filtered
/// - GET  /metrics            - Prometheus metrics
pub fn create_rest_router(service: Arc<GrantService>, config: &RestApiConfig) -> Router {
    let state = Arc::new(ApiState::new(service));

    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/tags", get(tags_handler))
        .route("/tags/effective", get(effective_tags_handler))
        .route("/grants", post(ingest_handler).get(list_grants_handler))
        .with_state(state);

    // Build the full router with prefix
    let mut router = Router::new()
        .nest(&config.prefix, api_routes)
        .route("/metrics", get(metrics_handler));

    // Add CORS if enabled
    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);

        router = router.layer(cors);
    }

    router
}
