//! Reply extraction from backend responses.

use serde_json::Value;

use crate::backends::BackendError;

/// Fields of a completion-service reply that may hold the text, in lookup order.
pub const COMPLETION_REPLY_FIELDS: [&str; 3] = ["response", "output", "text"];

/// Extract the reply text from a foundation-model response.
///
/// The shape is sniffed in a fixed order:
/// 1. top-level `content` (Claude 3 messages): first `"type": "text"` block,
/// 2. `output.message.content` (Nova converse): first block with non-blank text,
/// 3. top-level `completion` (legacy).
///
/// A known shape without text yields an empty string. Only a body that is not
/// JSON is an error.
pub fn foundation_reply(body: &[u8]) -> Result<String, BackendError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        BackendError::InvalidResponse(format!("foundation model returned invalid JSON: {}", e))
    })?;

    if let Some(content) = value.get("content") {
        return Ok(first_text(content, |block| {
            block.get("type").and_then(Value::as_str) == Some("text")
        }));
    }

    if let Some(content) = value.pointer("/output/message/content") {
        return Ok(first_text(content, |block| {
            block
                .get("text")
                .and_then(Value::as_str)
                .is_some_and(|text| !text.trim().is_empty())
        }));
    }

    Ok(value
        .get("completion")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default())
}

fn first_text(content: &Value, accept: impl Fn(&Value) -> bool) -> String {
    content
        .as_array()
        .and_then(|blocks| blocks.iter().find(|&block| accept(block)))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// Extract the reply text from the completion service.
///
/// Non-JSON bodies, and JSON without any of [`COMPLETION_REPLY_FIELDS`], are
/// relayed verbatim.
pub fn completion_reply(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    COMPLETION_REPLY_FIELDS
        .iter()
        .find_map(|field| value.get(field))
        .map(|reply| match reply {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.to_string())
}
