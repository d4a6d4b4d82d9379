//! Third-party completion endpoint request.

use serde::{Deserialize, Serialize};

use crate::prompt::CanonicalPrompt;

/// Body posted to the hosted completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
}

impl From<CanonicalPrompt> for CompletionRequest {
    fn from(prompt: CanonicalPrompt) -> Self {
        Self {
            prompt: prompt.into_inner(),
        }
    }
}
