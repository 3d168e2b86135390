//! Chaining example using OpenAI: the reply of one call feeds the next.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example openai_chain
//! ```

#![allow(clippy::print_stdout)]

use genlab::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let client = OpenAI::from_env()?;

    let chain = Chain::new()
        .step(
            ChainStep::new("Write a short paragraph about {input}.")
                .model("gpt-4o-mini")
                .max_tokens(200),
        )
        .step(
            ChainStep::new("Summarize the following text in one sentence:\n\n{input}")
                .system("You are a concise editor.")
                .model("gpt-4o-mini")
                .temperature(0.0),
        );

    let output = chain.run(&client, "the history of the printing press").await?;

    for (index, step) in output.steps.iter().enumerate() {
        println!("Step {}:\n{}\n", index + 1, step.output);
    }
    println!("{}", output.usage());

    Ok(())
}
