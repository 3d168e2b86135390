//! OpenAI API client implementation.
//!
//! This module provides a client for the OpenAI API, supporting:
//! - Text completions
//! - Chat completions (synchronous and streaming)
//! - Moderation
//! - Speech-to-Text (Whisper transcription and translation)

mod audio;
mod chat;
mod client;
mod completion;
mod config;
mod moderation;
mod stream;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
