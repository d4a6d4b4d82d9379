//! Translation of the client body into the backend's wire payload.

use inference_gateway_common::{CanonicalPrompt, CompletionRequest, FoundationPayload};
use serde_json::Value;

use super::route::{RouteDecision, TensorModel};
use crate::config::Targets;
use crate::error::{GatewayError, Result};

/// Client input after validation, before any configuration is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientInput {
    /// Tensor routes forward the body untouched, JSON or not.
    Tensor { model: TensorModel, body: Vec<u8> },
    Foundation(CanonicalPrompt),
    ThirdParty(CanonicalPrompt),
}

/// The exact request sent to one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    Tensor {
        endpoint: String,
        body: Vec<u8>,
    },
    Foundation {
        model_id: String,
        payload: FoundationPayload,
    },
    ThirdParty {
        url: String,
        request: CompletionRequest,
    },
}

/// Validate the decoded body for a route.
///
/// Chat routes need a JSON body carrying a canonical prompt.
pub fn parse_input(route: RouteDecision, body: Vec<u8>) -> Result<ClientInput> {
    match route {
        RouteDecision::Tensor(model) => Ok(ClientInput::Tensor { model, body }),
        RouteDecision::Foundation => prompt_from(&body).map(ClientInput::Foundation),
        RouteDecision::ThirdParty => prompt_from(&body).map(ClientInput::ThirdParty),
    }
}

fn prompt_from(body: &[u8]) -> Result<CanonicalPrompt> {
    let value: Value = serde_json::from_slice(body).map_err(|_| GatewayError::InvalidJson)?;
    CanonicalPrompt::from_body(&value).ok_or(GatewayError::MissingPrompt)
}

impl ClientInput {
    /// Bind the input to the backend currently configured for it.
    pub fn into_payload(self, targets: &Targets) -> ProviderPayload {
        match self {
            Self::Tensor { model, body } => ProviderPayload::Tensor {
                endpoint: targets.tensor.endpoint(model).to_string(),
                body,
            },
            Self::Foundation(prompt) => {
                let model_id = targets.foundation.model_id.clone();
                let payload = FoundationPayload::for_model(
                    &model_id,
                    &targets.foundation.system_prompt,
                    &prompt,
                );
                ProviderPayload::Foundation { model_id, payload }
            }
            Self::ThirdParty(prompt) => ProviderPayload::ThirdParty {
                url: targets.completion.url.clone(),
                request: CompletionRequest::from(prompt),
            },
        }
    }
}
