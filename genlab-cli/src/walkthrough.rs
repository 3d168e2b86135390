//! The documented API examples, run in order against one backend.
//!
//! Each example is a single request (chaining makes two) whose designated
//! reply field is reported. A failing example is recorded and the remaining
//! examples still run.

use std::fmt;
use std::path::Path;

use genlab::prelude::*;
use tracing::{error, info};

/// Prompt of the completion example.
pub const COMPLETION_PROMPT: &str = "Say this is a test";
/// Input of the moderation example.
pub const MODERATION_INPUT: &str = "I want to kill them.";
/// Prompt hint sent with the transcription example.
pub const TRANSCRIPTION_HINT: &str = "A short spoken recording.";
/// Chain input used when no audio file is given.
pub const CHAIN_TOPIC: &str = "why the sky is blue";

/// One documented example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Example {
    /// Text completion.
    Completion,
    /// Multi-turn chat.
    Chat,
    /// Moderation of a violent sentence.
    Moderation,
    /// Whisper transcription.
    Transcription,
    /// Whisper translation into English.
    Translation,
    /// Two calls where the first reply feeds the second.
    Chaining,
}

impl Example {
    /// All examples in walkthrough order.
    pub const ALL: [Self; 6] = [
        Self::Completion,
        Self::Chat,
        Self::Moderation,
        Self::Transcription,
        Self::Translation,
        Self::Chaining,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Chat => "chat",
            Self::Moderation => "moderation",
            Self::Transcription => "transcription",
            Self::Translation => "translation",
            Self::Chaining => "chaining",
        }
    }

    /// Whether the example cannot run without an audio file.
    #[must_use]
    pub const fn requires_audio(self) -> bool {
        matches!(self, Self::Transcription | Self::Translation)
    }
}

impl fmt::Display for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened to one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The example ran; holds the text it reports.
    Completed(String),
    /// The example was not run.
    Skipped(&'static str),
    /// The example failed; holds the error message.
    Failed(String),
}

/// Result of one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Which example.
    pub example: Example,
    /// Its outcome.
    pub outcome: Outcome,
}

impl Report {
    /// Returns `true` if the example failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// A backend able to serve every example.
pub trait Backend:
    CompletionProvider + ChatProvider + ModerationProvider + SpeechToTextProvider
{
}

impl<T> Backend for T where
    T: CompletionProvider + ChatProvider + ModerationProvider + SpeechToTextProvider + ?Sized
{
}

/// Run the selected examples in order.
pub async fn run<P>(provider: &P, audio: Option<&Path>, only: Option<Example>) -> Vec<Report>
where
    P: Backend + ?Sized,
{
    let mut reports = Vec::new();

    for example in Example::ALL {
        if only.is_some_and(|selected| selected != example) {
            continue;
        }

        let outcome = if example.requires_audio() && audio.is_none() {
            Outcome::Skipped("no audio file given (use --audio)")
        } else {
            info!(example = example.name(), "running example");
            match run_example(provider, example, audio).await {
                Ok(text) => Outcome::Completed(text),
                Err(e) => {
                    error!(example = example.name(), "example failed: {e}");
                    Outcome::Failed(e.to_string())
                }
            }
        };

        reports.push(Report { example, outcome });
    }

    reports
}

async fn run_example<P>(provider: &P, example: Example, audio: Option<&Path>) -> Result<String>
where
    P: Backend + ?Sized,
{
    match example {
        Example::Completion => {
            let request = CompletionRequest::new("", COMPLETION_PROMPT)
                .max_tokens(7)
                .temperature(0.0);
            let response = provider.complete(&request).await?;
            Ok(response.text().unwrap_or_default().to_owned())
        }
        Example::Chat => {
            let request = ChatRequest::new("")
                .system("You are a helpful assistant.")
                .user("Who won the world series in 2020?")
                .assistant("The Los Angeles Dodgers won the World Series in 2020.")
                .user("Where was it played?");
            let response = provider.chat(&request).await?;
            Ok(response.text().unwrap_or_default())
        }
        Example::Moderation => {
            let response = provider
                .moderate(&ModerationRequest::new(MODERATION_INPUT))
                .await?;
            let result = response
                .first()
                .ok_or_else(|| LlmError::response_format("one moderation result", "none"))?;
            Ok(describe_moderation(result))
        }
        Example::Transcription => {
            let path = audio.ok_or_else(|| LlmError::invalid_request("no audio file"))?;
            let response = provider
                .transcribe_file("", path, Some(TRANSCRIPTION_HINT))
                .await?;
            Ok(response.text)
        }
        Example::Translation => {
            let path = audio.ok_or_else(|| LlmError::invalid_request("no audio file"))?;
            Ok(provider.translate_file("", path, None).await?.text)
        }
        Example::Chaining => {
            let output = match audio {
                Some(path) => {
                    let transcript = provider.transcribe_file("", path, None).await?;
                    Chain::new()
                        .step(ChainStep::new(
                            "Summarize the following transcript in one sentence:\n\n{input}",
                        ))
                        .run(provider, &transcript.text)
                        .await?
                }
                None => {
                    Chain::new()
                        .step(ChainStep::new("Explain {input} in two sentences.").max_tokens(120))
                        .step(ChainStep::new(
                            "Rewrite this for a ten-year-old in one sentence:\n\n{input}",
                        ))
                        .run(provider, CHAIN_TOPIC)
                        .await?
                }
            };
            Ok(output.output().to_owned())
        }
    }
}

/// One-line moderation summary: flag status plus flagged categories.
#[must_use]
pub fn describe_moderation(result: &ModerationResult) -> String {
    let categories = result.flagged_categories();
    if categories.is_empty() {
        format!("flagged: {}", result.flagged)
    } else {
        format!("flagged: {} ({})", result.flagged, categories.join(", "))
    }
}
