//! CORS headers and preflight handling.

use std::collections::BTreeMap;

use crate::event::GatewayResponse;

/// Headers attached to every response, success or failure.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "OPTIONS,POST"),
];

pub fn cors_headers() -> BTreeMap<String, String> {
    CORS_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Answer to an OPTIONS request: 200, CORS headers, empty body.
pub fn preflight() -> GatewayResponse {
    GatewayResponse {
        status_code: 200,
        headers: cors_headers(),
        body: String::new(),
        is_base64_encoded: false,
    }
}
