//! Error taxonomy for the gateway pipeline.

use axum::http::StatusCode;

use crate::backends::BackendError;

/// Failure of one pipeline stage.
///
/// Routing and validation failures are detected before any backend call and
/// map to 400; backend and internal failures map to 500.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Could not determine the model from the path ({0}).")]
    Unroutable(String),

    #[error("Request body is empty.")]
    EmptyBody,

    #[error("Request body is not a valid JSON.")]
    InvalidJson,

    #[error("'prompt' is missing in the body.")]
    MissingPrompt,

    #[error("Internal server error: {0}")]
    Backend(#[from] BackendError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unroutable(_) | Self::EmptyBody | Self::InvalidJson | Self::MissingPrompt => {
                StatusCode::BAD_REQUEST
            }
            Self::Backend(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Taxonomy bucket, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unroutable(_) => "routing",
            Self::EmptyBody | Self::InvalidJson | Self::MissingPrompt => "validation",
            Self::Backend(_) => "backend",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(e: config::ConfigError) -> Self {
        Self::Internal(format!("invalid configuration: {}", e))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
