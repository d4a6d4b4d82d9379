//! Request pipeline: classify, normalize, invoke, extract.
//!
//! Every stage returns a [`Result`]; the first failure short-circuits the
//! rest and is turned into an error response. CORS headers are attached to
//! whatever comes out, including preflight answers that never reach the
//! classifier.

pub mod cors;
pub mod extract;
pub mod normalize;
pub mod route;

pub use normalize::{ClientInput, ProviderPayload};
pub use route::{classify, RouteDecision, TensorModel};

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::backends::{CompletionBackend, FoundationBackend, TensorBackend};
use crate::config::TargetSource;
use crate::error::Result;
use crate::event::{ApiGatewayEvent, GatewayResponse, IncomingRequest};

/// The backend clients, one per family. Built once, shared by all requests.
#[derive(Clone)]
pub struct Backends {
    pub tensor: Arc<dyn TensorBackend>,
    pub foundation: Arc<dyn FoundationBackend>,
    pub completion: Arc<dyn CompletionBackend>,
}

/// Stateless inference gateway.
///
/// Holds only read-only handles, so one instance serves concurrent requests
/// without locking.
pub struct Gateway {
    backends: Backends,
    targets: Arc<dyn TargetSource>,
}

impl Gateway {
    pub fn new(backends: Backends, targets: Arc<dyn TargetSource>) -> Self {
        Self { backends, targets }
    }

    /// Handle a proxy envelope.
    pub async fn handle_event(&self, event: ApiGatewayEvent) -> GatewayResponse {
        self.handle(IncomingRequest::from(event)).await
    }

    /// Handle one request end to end. Never fails: errors become responses.
    pub async fn handle(&self, request: IncomingRequest) -> GatewayResponse {
        let span = tracing::info_span!(
            "invocation",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );

        async move {
            tracing::debug!(
                base64 = request.is_base64_encoded,
                body_len = request.body.as_ref().map(String::len).unwrap_or(0),
                headers = request.headers.len(),
                "Received request"
            );

            if request.is_preflight() {
                return cors::preflight();
            }

            match self.process(&request).await {
                Ok(response) => response,
                Err(err) => {
                    if err.status().is_server_error() {
                        tracing::error!(kind = err.kind(), "{}", err);
                    } else {
                        tracing::info!(kind = err.kind(), "{}", err);
                    }
                    GatewayResponse::error(&err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&self, request: &IncomingRequest) -> Result<GatewayResponse> {
        let route = classify(&request.path)?;
        tracing::info!(route = %route, "Routed request");

        let body = request.decoded_body()?;
        let input = normalize::parse_input(route, body)?;

        let targets = self.targets.resolve()?;
        let payload = input.into_payload(&targets);

        self.invoke(payload).await
    }

    async fn invoke(&self, payload: ProviderPayload) -> Result<GatewayResponse> {
        match payload {
            ProviderPayload::Tensor { endpoint, body } => {
                let output = self.backends.tensor.invoke(&endpoint, body).await?;
                Ok(GatewayResponse::passthrough(output))
            }
            ProviderPayload::Foundation { model_id, payload } => {
                tracing::debug!(model_id = %model_id, family = %payload.family(), "Built foundation payload");
                let output = self
                    .backends
                    .foundation
                    .invoke(&model_id, payload.to_bytes()?)
                    .await?;
                GatewayResponse::reply(extract::foundation_reply(&output)?)
            }
            ProviderPayload::ThirdParty { url, request } => {
                let output = self.backends.completion.complete(&url, &request).await?;
                GatewayResponse::reply(extract::completion_reply(&output))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Targets;
    use crate::test_util::{gateway_with, FakeBackends};
    use inference_gateway_common::{ChatReply, ErrorBody};
    use serde_json::{json, Value};

    fn post(path: &str, body: &str) -> IncomingRequest {
        IncomingRequest {
            method: "POST".to_string(),
            path: path.to_string(),
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    fn error_of(response: &GatewayResponse) -> String {
        serde_json::from_str::<ErrorBody>(&response.body).unwrap().error
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let fakes = FakeBackends::new();
        let gateway = gateway_with(&fakes, Targets::default());

        for path in ["/unknown", "/api/bedrock-chat", ""] {
            let request = IncomingRequest {
                method: "OPTIONS".to_string(),
                path: path.to_string(),
                ..Default::default()
            };
            let response = gateway.handle(request).await;
            assert_eq!(response, cors::preflight());
        }
        assert_eq!(fakes.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let fakes = FakeBackends::new();
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway.handle(post("/unknown", "{}")).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(
            error_of(&response),
            "Could not determine the model from the path (/unknown)."
        );
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
    }

    #[tokio::test]
    async fn test_missing_body() {
        let fakes = FakeBackends::new();
        let gateway = gateway_with(&fakes, Targets::default());

        let mut request = post("/predict/mnist_classical", "");
        request.body = None;
        let response = gateway.handle(request).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(error_of(&response), "Request body is empty.");
        assert_eq!(fakes.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_requests_are_idempotent() {
        let fakes = FakeBackends::new();
        let gateway = gateway_with(&fakes, Targets::default());

        let cases = [
            ("", "Request body is empty."),
            ("{not json", "Request body is not a valid JSON."),
            (r#"{"prompt":"  "}"#, "'prompt' is missing in the body."),
        ];
        for (body, message) in cases {
            for _ in 0..3 {
                let response = gateway.handle(post("/api/bedrock-chat", body)).await;
                assert_eq!(response.status_code, 400);
                assert_eq!(error_of(&response), message);
            }
        }
        assert_eq!(fakes.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tensor_passthrough() {
        let fakes = FakeBackends::new().with_tensor_reply(r#"{"predicted_class":3}"#);
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway
            .handle(post("/predict/mnist_classical", r#"{"any":"json"}"#))
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"predicted_class":3}"#);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(
            fakes.tensor_calls(),
            vec![(
                "mnist-classical-endpoint".to_string(),
                br#"{"any":"json"}"#.to_vec()
            )]
        );
    }

    #[tokio::test]
    async fn test_base64_body_is_decoded() {
        use base64::Engine;
        let fakes = FakeBackends::new().with_foundation_reply(
            r#"{"content":[{"type":"text","text":"ok"}]}"#,
        );
        let gateway = gateway_with(&fakes, Targets::default());

        let mut request = post(
            "/api/bedrock-chat",
            &base64::engine::general_purpose::STANDARD.encode(r#"{"prompt":"explain VQE"}"#),
        );
        request.is_base64_encoded = true;
        let response = gateway.handle(request).await;
        assert_eq!(response.status_code, 200);

        let (_, payload) = fakes.foundation_calls().remove(0);
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["messages"][0]["content"][0]["text"], "explain VQE");
    }

    #[tokio::test]
    async fn test_foundation_reply() {
        let fakes = FakeBackends::new().with_foundation_reply(
            r#"{"content":[{"type":"text","text":" VQE is variational. "}]}"#,
        );
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway
            .handle(post("/api/bedrock-chat", r#"{"prompt":"explain VQE"}"#))
            .await;
        assert_eq!(response.status_code, 200);
        let reply: ChatReply = serde_json::from_str(&response.body).unwrap();
        assert_eq!(reply.response, "VQE is variational.");

        let (model_id, payload) = fakes.foundation_calls().remove(0);
        assert!(model_id.contains("claude-3"));
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["anthropic_version"], "bedrock-2023-05-31");
        assert!(payload["system"].is_string());
        assert_eq!(payload["messages"][0]["content"][0]["text"], "explain VQE");
    }

    #[tokio::test]
    async fn test_nova_model_resolved_per_call() {
        let fakes = FakeBackends::new()
            .with_foundation_reply(r#"{"output":{"message":{"content":[{"text":"hola"}]}}}"#);
        let mut targets = Targets::default();
        targets.foundation.model_id = "amazon.nova-lite-v1:0".to_string();
        let gateway = gateway_with(&fakes, targets);

        let response = gateway
            .handle(post("/bedrock-chat/chat", r#"{"message":"hi"}"#))
            .await;
        let reply: ChatReply = serde_json::from_str(&response.body).unwrap();
        assert_eq!(reply.response, "hola");

        let (model_id, payload) = fakes.foundation_calls().remove(0);
        assert_eq!(model_id, "amazon.nova-lite-v1:0");
        let payload: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(payload["inferenceConfig"]["maxTokens"], 800);
    }

    #[tokio::test]
    async fn test_third_party_reply() {
        let fakes = FakeBackends::new().with_completion_reply("not json at all");
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway.handle(post("/hf-chat", r#"{"prompt":"hola"}"#)).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            serde_json::from_str::<Value>(&response.body).unwrap(),
            json!({"response": "not json at all"})
        );
        assert_eq!(fakes.completion_calls()[0].1.prompt, "hola");
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal_error() {
        let fakes = FakeBackends::new().failing();
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway
            .handle(post("/predict/mnist_hybrid", r#"{"input":"x"}"#))
            .await;
        assert_eq!(response.status_code, 500);
        assert!(error_of(&response).starts_with("Internal server error: "));
        assert_eq!(response.headers["Access-Control-Allow-Methods"], "OPTIONS,POST");
        assert_eq!(fakes.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_json_foundation_output_is_internal_error() {
        let fakes = FakeBackends::new().with_foundation_reply("<html>");
        let gateway = gateway_with(&fakes, Targets::default());

        let response = gateway
            .handle(post("/api/bedrock-chat", r#"{"prompt":"hi"}"#))
            .await;
        assert_eq!(response.status_code, 500);
    }

    #[tokio::test]
    async fn test_handle_event() {
        let fakes = FakeBackends::new().with_tensor_reply(r#"{"prediction":"POSITIVO"}"#);
        let gateway = gateway_with(&fakes, Targets::default());

        let event: ApiGatewayEvent = serde_json::from_value(json!({
            "httpMethod": "POST",
            "path": "/default/predict/sentiment_hf",
            "body": "{\"text\":\"me encanta\"}",
            "isBase64Encoded": false
        }))
        .unwrap();
        let response = gateway.handle_event(event).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"prediction":"POSITIVO"}"#);
        assert_eq!(fakes.tensor_calls()[0].0, "sentiment-hf-endpoint");
    }
}
