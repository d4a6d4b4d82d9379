//! SageMaker Runtime adapter for the tensor-model routes.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sagemakerruntime::error::DisplayErrorContext;
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_sdk_sagemakerruntime::Client;

use super::{BackendError, TensorBackend};

/// Invokes SageMaker real-time endpoints with a JSON body.
pub struct SageMakerBackend {
    client: Client,
}

impl SageMakerBackend {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TensorBackend for SageMakerBackend {
    async fn invoke(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(endpoint, bytes = body.len(), "Invoking SageMaker endpoint");

        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(endpoint)
            .content_type("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| BackendError::Tensor {
                endpoint: endpoint.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output
            .body()
            .map(|blob| blob.as_ref().to_vec())
            .unwrap_or_default())
    }
}
