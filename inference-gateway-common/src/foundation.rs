//! Foundation-model request formats.
//!
//! The hosted foundation models accept three incompatible request bodies.
//! Which one a model understands is decided by its identifier, see
//! [`ModelFamily::from_model_id`]. Exactly one shape is built per request.

use serde::{Deserialize, Serialize};

use crate::prompt::CanonicalPrompt;

/// Version tag required by the Claude 3 messages format.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
/// Schema tag required by the Nova converse format.
pub const CONVERSE_SCHEMA_VERSION: &str = "messages-v1";

pub const MAX_TOKENS: u32 = 800;
pub const TEMPERATURE: f64 = 0.3;
pub const TOP_P: f64 = 0.9;

const HUMAN_TURN: &str = "\n\nHuman: ";
const ASSISTANT_TURN: &str = "\n\nAssistant:";

/// Request format family of a foundation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Claude 3 messages API (`anthropic_version`, `system`, `messages`).
    Claude3,
    /// Nova converse-style body (`inferenceConfig`, list-of-blocks content).
    Nova,
    /// Legacy text completion with Human/Assistant turns.
    Legacy,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [Self::Claude3, Self::Nova, Self::Legacy];

    /// Detect the family from a model identifier.
    ///
    /// Substrings are checked in a fixed order, `claude-3` before `nova`.
    /// Anything else is treated as a legacy completion model, so a new id
    /// that happens to contain `nova` is routed to the converse format.
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.contains("claude-3") {
            Self::Claude3
        } else if model_id.contains("nova") {
            Self::Nova
        } else {
            Self::Legacy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claude3 => "claude3",
            Self::Nova => "nova",
            Self::Legacy => "legacy",
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Claude 3 messages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesPayload {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub system: String,
    pub messages: Vec<MessagesTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesTurn {
    pub role: String,
    pub content: Vec<MessagesContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

// ============================================================================
// Nova converse
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversePayload {
    pub schema_version: String,
    pub system: Vec<TextBlock>,
    pub messages: Vec<ConverseTurn>,
    pub inference_config: InferenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverseTurn {
    pub role: String,
    pub content: Vec<TextBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

// ============================================================================
// Legacy completion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub prompt: String,
    pub max_tokens_to_sample: u32,
    pub temperature: f64,
    pub top_p: f64,
}

// ============================================================================
// Payload selection
// ============================================================================

/// A foundation-model request body in exactly one of the three formats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FoundationPayload {
    Messages(MessagesPayload),
    Converse(ConversePayload),
    Completion(CompletionPayload),
}

impl FoundationPayload {
    /// Build the body the given model family expects.
    pub fn build(family: ModelFamily, system: &str, prompt: &CanonicalPrompt) -> Self {
        match family {
            ModelFamily::Claude3 => Self::Messages(MessagesPayload {
                anthropic_version: ANTHROPIC_VERSION.to_string(),
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                system: system.to_string(),
                messages: vec![MessagesTurn {
                    role: "user".to_string(),
                    content: vec![MessagesContent {
                        content_type: "text".to_string(),
                        text: prompt.as_str().to_string(),
                    }],
                }],
            }),
            ModelFamily::Nova => Self::Converse(ConversePayload {
                schema_version: CONVERSE_SCHEMA_VERSION.to_string(),
                system: vec![TextBlock {
                    text: system.to_string(),
                }],
                messages: vec![ConverseTurn {
                    role: "user".to_string(),
                    content: vec![TextBlock {
                        text: prompt.as_str().to_string(),
                    }],
                }],
                inference_config: InferenceConfig::default(),
            }),
            ModelFamily::Legacy => Self::Completion(CompletionPayload {
                prompt: format!("{HUMAN_TURN}{system}\n\n{prompt}{ASSISTANT_TURN}"),
                max_tokens_to_sample: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
            }),
        }
    }

    /// Build the body for a model identifier.
    pub fn for_model(model_id: &str, system: &str, prompt: &CanonicalPrompt) -> Self {
        Self::build(ModelFamily::from_model_id(model_id), system, prompt)
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            Self::Messages(_) => ModelFamily::Claude3,
            Self::Converse(_) => ModelFamily::Nova,
            Self::Completion(_) => ModelFamily::Legacy,
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
