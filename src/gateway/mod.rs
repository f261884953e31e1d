//! HTTP gateway (Axum) over the comparison pipeline and corpus search.
//!
//! Every upload endpoint takes `multipart/form-data`; every response body is JSON.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ERROR_KIND_HEADER, ErrorResponse, GatewayError};
pub use handler::{
    SERVICE_NAME, cache_clear_handler, cache_stats_handler, compare_handler, health_handler,
    search_handler,
};
pub use state::HandlerState;

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::embedding::EmbeddingProvider;

pub fn create_router_with_state<P>(state: HandlerState<P>) -> Router
where
    P: EmbeddingProvider + 'static,
{
    create_router_with_limit(state, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Router with an explicit request body limit, in bytes.
pub fn create_router_with_limit<P>(state: HandlerState<P>, max_upload_bytes: usize) -> Router
where
    P: EmbeddingProvider + 'static,
{
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/compare", post(compare_handler::<P>))
        .route("/api/search", post(search_handler::<P>))
        .route("/api/cache/clear", post(cache_clear_handler::<P>))
        .route("/api/cache/stats", get(cache_stats_handler::<P>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
