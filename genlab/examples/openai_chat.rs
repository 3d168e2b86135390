//! Chat completion example using OpenAI, blocking and streamed.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example openai_chat
//! ```

#![allow(clippy::print_stdout)]

use futures::StreamExt;
use genlab::prelude::*;
use std::io::{Write, stdout};

#[tokio::main]
async fn main() -> Result<()> {
    let client = OpenAI::from_env()?;

    let request = ChatRequest::new("gpt-4o-mini")
        .system("You are a helpful assistant.")
        .user("Who won the world series in 2020?")
        .assistant("The Los Angeles Dodgers won the World Series in 2020.")
        .user("Where was it played?");

    let response = client.chat(&request).await?;
    println!("{}", response.text().unwrap_or_default());

    println!("\nStreaming:");
    let mut stream = client
        .chat_stream(&ChatRequest::new("gpt-4o-mini").user("Write a haiku about recursion."))
        .await?;
    while let Some(chunk) = stream.next().await {
        if let StreamChunk::Text { content } = chunk? {
            print!("{content}");
            stdout().flush()?;
        }
    }
    println!();

    Ok(())
}
