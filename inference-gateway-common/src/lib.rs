//! Inference Gateway Common Types
//!
//! Wire types shared by the gateway's normalizer, backend adapters and
//! response extractor.

pub mod completion;
pub mod foundation;
pub mod prompt;
pub mod reply;

pub use completion::CompletionRequest;
pub use foundation::{
    CompletionPayload, ConversePayload, FoundationPayload, InferenceConfig, MessagesPayload,
    ModelFamily,
};
pub use prompt::CanonicalPrompt;
pub use reply::{ChatReply, ErrorBody};
