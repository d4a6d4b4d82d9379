//! Bridge between axum requests and the gateway pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::event::{GatewayResponse, IncomingRequest};
use crate::gateway::Gateway;

/// Fallback handler: every request not answered locally.
pub async fn dispatch(
    State(gateway): State<Arc<Gateway>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection).into_response(),
    };

    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let request = IncomingRequest::from_http(method.as_str(), uri.path(), headers, &body);
    gateway.handle(request).await.into_response()
}

/// A body axum refused to buffer (over the size limit, or a broken stream).
fn rejected(rejection: BytesRejection) -> GatewayResponse {
    let status = rejection.status();
    let message = rejection.body_text();
    tracing::info!(status = status.as_u16(), "Rejected request body: {}", message);
    GatewayResponse::error_message(status.as_u16(), message)
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut builder = Response::builder().status(status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(Body::from(self.body_bytes()))
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build response: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}
