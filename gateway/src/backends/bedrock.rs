//! Bedrock Runtime adapter for the foundation-model route.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;

use super::{BackendError, FoundationBackend};

/// Calls `InvokeModel` with an already-shaped JSON payload.
pub struct BedrockBackend {
    client: Client,
}

impl BedrockBackend {
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
impl FoundationBackend for BedrockBackend {
    async fn invoke(&self, model_id: &str, payload: Vec<u8>) -> Result<Vec<u8>, BackendError> {
        tracing::debug!(model_id, bytes = payload.len(), "Invoking Bedrock model");

        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| BackendError::Foundation {
                model_id: model_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.body().as_ref().to_vec())
    }
}
