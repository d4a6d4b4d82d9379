//! HTTP adapter for the third-party completion service.

use async_trait::async_trait;
use inference_gateway_common::CompletionRequest;
use reqwest::Client;

use super::{BackendError, CompletionBackend};

/// Posts `{"prompt": ...}` to a hosted completion endpoint.
pub struct HttpCompletionBackend {
    http_client: Client,
}

impl HttpCompletionBackend {
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
        }
    }
}

impl Default for HttpCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionBackend {
    async fn complete(
        &self,
        url: &str,
        request: &CompletionRequest,
    ) -> Result<String, BackendError> {
        tracing::debug!(url, "Calling completion endpoint");

        let response = self.http_client.post(url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
