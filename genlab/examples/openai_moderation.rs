//! Moderation example using OpenAI.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example openai_moderation
//! ```

#![allow(clippy::print_stdout)]

use genlab::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let client = OpenAI::from_env()?;

    let request = ModerationRequest::batch(["I want to kill them.", "I love sunny mornings."]);
    let response = client.moderate(&request).await?;

    for (input, result) in request.input.iter().zip(&response.results) {
        println!("{input:?}");
        println!("  flagged: {}", result.flagged);
        if let Some((category, score)) = result.top_category() {
            println!("  top category: {category} ({score:.4})");
        }
        for category in result.flagged_categories() {
            println!("  - {category}");
        }
    }

    Ok(())
}
