//! Status Page REST API Server Library
//!
//! Serves the read model of a GitHub Projects backed status page to browser
//! frontends and other integrations.

pub mod cli;
pub mod routes;

use axum::Router;
use statuspage::{ProjectSource, StatusPage};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-export for convenience
pub use routes::create_routes;

/// Full application: routes plus permissive CORS and request tracing.
pub fn app<S: ProjectSource + 'static>(page: Arc<StatusPage<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_routes(page)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
