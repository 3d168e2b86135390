//! Genlab - typed access to hosted generative AI endpoints
//!
//! This crate covers the endpoint families of an OpenAI-style API: text
//! completion, chat completion (blocking and streamed), moderation, and
//! Whisper speech-to-text (transcription and translation). Each family has a
//! provider trait, an HTTP backend in [`llms`], and a deterministic
//! [`mock::MockProvider`] for tests. [`chain::Chain`] pipes the reply of one
//! chat request into the prompt of the next.

pub mod audio;
pub mod chain;
pub mod chat;
pub mod completion;
pub mod error;
pub mod llms;
pub mod message;
pub mod mock;
pub mod moderation;
pub mod prelude;
pub mod stream;
pub mod usage;

pub use error::{Error, LlmError, LlmErrorKind, Result};
