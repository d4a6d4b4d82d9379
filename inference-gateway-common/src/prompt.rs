//! Canonical prompt extraction.

use serde_json::Value;

/// Body keys accepted for the prompt, in lookup order.
pub const PROMPT_KEYS: [&str; 2] = ["prompt", "message"];

/// The single text input of a chat request, trimmed and never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPrompt(String);

impl CanonicalPrompt {
    /// Pull the prompt out of a client body.
    ///
    /// The first key in [`PROMPT_KEYS`] holding a non-blank string wins.
    /// Returns `None` when the body is not an object or no key qualifies.
    pub fn from_body(body: &Value) -> Option<Self> {
        PROMPT_KEYS
            .iter()
            .filter_map(|key| body.get(key))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(|text| Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CanonicalPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
