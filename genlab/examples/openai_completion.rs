//! Text completion example using OpenAI.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example openai_completion
//! ```

#![allow(clippy::print_stdout)]

use genlab::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let client = OpenAI::from_env()?;

    let request = CompletionRequest::new("gpt-3.5-turbo-instruct", "Say this is a test")
        .max_tokens(7)
        .temperature(0.0);
    let response = client.complete(&request).await?;

    println!("{}", response.text().unwrap_or_default());

    if let Some(usage) = response.usage {
        println!("\n{usage}");
    }

    Ok(())
}
