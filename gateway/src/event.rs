//! Inbound envelopes and the outbound response.
//!
//! The gateway accepts both API Gateway proxy envelopes: the HTTP API (v2)
//! shape with `requestContext.http.method` and `rawPath`, and the REST API
//! (v1) shape with `httpMethod` and `path`. Both are reduced to an
//! [`IncomingRequest`] before routing.

use std::collections::{BTreeMap, HashMap};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};
use crate::gateway::cors::cors_headers;
use inference_gateway_common::{ChatReply, ErrorBody};

// ============================================================================
// Inbound
// ============================================================================

/// API Gateway proxy event, either payload version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayEvent {
    #[serde(default)]
    pub request_context: Option<RequestContext>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpContext {
    #[serde(default)]
    pub method: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl ApiGatewayEvent {
    /// HTTP method, preferring the v2 location. Upper-cased, empty if absent.
    pub fn method(&self) -> String {
        let v2 = self
            .request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref());
        non_empty(v2)
            .or_else(|| non_empty(self.http_method.as_deref()))
            .unwrap_or_default()
            .to_uppercase()
    }

    /// Request path, preferring `rawPath`. Empty if absent.
    pub fn path(&self) -> String {
        non_empty(self.raw_path.as_deref())
            .or_else(|| non_empty(self.path.as_deref()))
            .unwrap_or_default()
            .to_string()
    }
}

/// A client request, independent of how it reached the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
}

impl IncomingRequest {
    /// Build from plain HTTP parts. A body that is not UTF-8 is carried as base64.
    pub fn from_http(
        method: &str,
        path: &str,
        headers: HashMap<String, String>,
        body: &[u8],
    ) -> Self {
        let (body, is_base64_encoded) = match std::str::from_utf8(body) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(body), true),
        };
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            headers,
            body: Some(body),
            is_base64_encoded,
        }
    }

    pub fn is_preflight(&self) -> bool {
        self.method.eq_ignore_ascii_case("OPTIONS")
    }

    /// Raw body bytes, base64-decoded when the envelope says so.
    pub fn decoded_body(&self) -> Result<Vec<u8>> {
        let raw = self
            .body
            .as_deref()
            .filter(|body| !body.is_empty())
            .ok_or(GatewayError::EmptyBody)?;

        if self.is_base64_encoded {
            STANDARD
                .decode(raw.trim())
                .map_err(|_| GatewayError::InvalidJson)
        } else {
            Ok(raw.as_bytes().to_vec())
        }
    }
}

impl From<ApiGatewayEvent> for IncomingRequest {
    fn from(event: ApiGatewayEvent) -> Self {
        Self {
            method: event.method(),
            path: event.path(),
            headers: event.headers.unwrap_or_default(),
            body: event.body,
            is_base64_encoded: event.is_base64_encoded,
        }
    }
}

// ============================================================================
// Outbound
// ============================================================================

/// Proxy-integration response: status, headers, string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl GatewayResponse {
    /// JSON response with CORS headers.
    pub fn json(status_code: u16, body: String) -> Self {
        let mut headers = cors_headers();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// Relay backend bytes unchanged. Non UTF-8 output is base64-encoded and flagged.
    pub fn passthrough(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(body) => Self::json(200, body),
            Err(e) => {
                let mut response = Self::json(200, STANDARD.encode(e.into_bytes()));
                response.is_base64_encoded = true;
                response
            }
        }
    }

    /// `{"response": text}` with status 200.
    pub fn reply(text: impl Into<String>) -> Result<Self> {
        let body = serde_json::to_string(&ChatReply::new(text))?;
        Ok(Self::json(200, body))
    }

    /// `{"error": message}` with the status of the error.
    pub fn error(err: &GatewayError) -> Self {
        Self::error_message(err.status().as_u16(), err.to_string())
    }

    /// `{"error": message}` with an explicit status, for failures raised
    /// outside the pipeline.
    pub fn error_message(status_code: u16, message: impl Into<String>) -> Self {
        // A single string field always serializes.
        let body = serde_json::to_string(&ErrorBody::new(message)).unwrap_or_default();
        Self::json(status_code, body)
    }

    /// Body as raw bytes, undoing the base64 transport encoding.
    pub fn body_bytes(&self) -> Vec<u8> {
        if self.is_base64_encoded {
            if let Ok(bytes) = STANDARD.decode(&self.body) {
                return bytes;
            }
        }
        self.body.clone().into_bytes()
    }
}
