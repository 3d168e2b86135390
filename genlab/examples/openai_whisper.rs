//! Whisper transcription and translation example using OpenAI.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example openai_whisper -- path/to/audio.mp3
//! ```

#![allow(clippy::print_stdout)]

use genlab::prelude::*;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter("genlab=debug")
        .init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        println!("usage: openai_whisper <audio file>");
        return Ok(());
    };

    let client = OpenAI::from_env()?;

    let transcript = client
        .transcribe_file("whisper-1", &path, Some("Transcript of a short recording."))
        .await?;
    println!("Transcription:\n{}", transcript.text);

    let translation = client.translate_file("whisper-1", &path, None).await?;
    println!("\nEnglish translation:\n{}", translation.text);

    Ok(())
}
