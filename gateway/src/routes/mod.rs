//! HTTP surface of the gateway.

pub mod dispatch;
pub mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::gateway::Gateway;

/// Build the router: `GET /health` is answered locally, everything else
/// (any method, any path) goes through the gateway pipeline. Bodies are
/// capped at `max_body_bytes`.
pub fn router(gateway: Arc<Gateway>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health).fallback(dispatch::dispatch))
        .fallback(dispatch::dispatch)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(gateway)
}
