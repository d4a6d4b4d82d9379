//! Backend adapters, one per backend family.
//!
//! Each family sits behind a trait so the gateway can be built with the real
//! AWS and HTTP clients in production and with in-memory fakes in tests. The
//! clients are constructed once at startup and shared read-only.

mod bedrock;
mod completion;
mod sagemaker;

pub use bedrock::BedrockBackend;
pub use completion::HttpCompletionBackend;
pub use sagemaker::SageMakerBackend;

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use inference_gateway_common::CompletionRequest;

/// Errors surfaced by a backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("SageMaker endpoint '{endpoint}' failed: {message}")]
    Tensor { endpoint: String, message: String },

    #[error("Bedrock model '{model_id}' failed: {message}")]
    Foundation { model_id: String, message: String },

    #[error("Completion request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Tensor-model serving endpoint: JSON in, raw inference output back.
#[async_trait]
pub trait TensorBackend: Send + Sync {
    async fn invoke(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError>;
}

/// Foundation-model host: serialized payload in, model-specific JSON back.
#[async_trait]
pub trait FoundationBackend: Send + Sync {
    async fn invoke(&self, model_id: &str, payload: Vec<u8>) -> Result<Vec<u8>, BackendError>;
}

/// Third-party completion service: `{"prompt"}` in, response text back.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        url: &str,
        request: &CompletionRequest,
    ) -> Result<String, BackendError>;
}

/// Shared AWS configuration for the SageMaker and Bedrock clients.
///
/// Credentials come from the standard provider chain. Retries are disabled:
/// a failed call is reported once and the caller decides whether to retry.
pub async fn load_aws_config(region: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}
