//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//! ```

pub use crate::llms::{OpenAI, OpenAIConfig};

pub use crate::error::{Error, LlmError, LlmErrorKind, Result};

pub use crate::audio::{
    AudioFormat, SpeechToTextProvider, TranscriptionRequest, TranscriptionResponse,
    TranscriptionResponseFormat, TranslationRequest,
};
pub use crate::chain::{Chain, ChainOutput, ChainStep, StepRecord};
pub use crate::chat::{
    ChatProvider, ChatProviderExt, ChatRequest, ChatResponse, ChatStream, SharedChatProvider,
};
pub use crate::completion::{
    CompletionChoice, CompletionProvider, CompletionRequest, CompletionResponse,
};
pub use crate::message::{Message, Role};
pub use crate::mock::MockProvider;
pub use crate::moderation::{
    ModerationCategory, ModerationProvider, ModerationRequest, ModerationResponse,
    ModerationResult,
};
pub use crate::stream::{StopReason, StreamAggregator, StreamChunk};
pub use crate::usage::Usage;
