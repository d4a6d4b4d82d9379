pub mod backends;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod logging;
pub mod routes;
pub mod test_util;

pub use backends::{
    BackendError, BedrockBackend, CompletionBackend, FoundationBackend, HttpCompletionBackend,
    SageMakerBackend, TensorBackend,
};
pub use crate::config::{Config, LayeredTargets, ServerConfig, TargetSource, Targets};
pub use error::GatewayError;
pub use event::{ApiGatewayEvent, GatewayResponse, IncomingRequest};
pub use gateway::{Backends, Gateway, RouteDecision, TensorModel};

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

/// Full application: gateway routes plus request logging and tracing layers.
pub fn app(gateway: Arc<Gateway>, server: &ServerConfig) -> Router {
    routes::router(gateway, server.max_body_bytes)
        .layer(middleware::from_fn(logging::request_logger))
        .layer(TraceLayer::new_for_http())
}
