//! Sequential prompt chains.
//!
//! A [`Chain`] runs a fixed list of [`ChainStep`]s once, in order. Each step's
//! template is rendered with the previous step's reply (or the chain input for
//! the first step) and sent as a single chat request.
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let chain = Chain::new()
//!     .step(ChainStep::new("Write a one-line poem about {input}."))
//!     .step(ChainStep::new("Translate into French:\n{input}"));
//!
//! let output = chain.run(&provider, "the sea").await?;
//! println!("{}", output.output());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{ChatProvider, ChatRequest};
use crate::error::{Error, Result};
use crate::usage::Usage;

/// Placeholder replaced by the step input.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// One step of a chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    /// Prompt template; `{input}` is replaced by the step input.
    pub template: String,
    /// Optional system prompt for this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Model override. Empty means the provider default.
    #[serde(default)]
    pub model: String,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChainStep {
    /// Creates a step from a template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Default::default()
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum tokens.
    #[must_use]
    pub const fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Renders the template with the given input.
    ///
    /// A template without `{input}` gets the input appended after a blank line.
    #[must_use]
    pub fn render(&self, input: &str) -> String {
        if self.template.contains(INPUT_PLACEHOLDER) {
            self.template.replace(INPUT_PLACEHOLDER, input)
        } else if self.template.is_empty() {
            input.to_owned()
        } else {
            format!("{}\n\n{input}", self.template)
        }
    }

    fn request(&self, prompt: String) -> ChatRequest {
        let mut request = ChatRequest::new(self.model.clone());
        if let Some(system) = &self.system {
            request = request.system(system.clone());
        }
        request = request.user(prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }
}

/// Record of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The rendered prompt that was sent.
    pub prompt: String,
    /// The reply text.
    pub output: String,
    /// Token usage for the step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Result of running a chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainOutput {
    /// Executed steps, in order.
    pub steps: Vec<StepRecord>,
}

impl ChainOutput {
    /// The final step's reply.
    #[must_use]
    pub fn output(&self) -> &str {
        self.steps.last().map_or("", |s| s.output.as_str())
    }

    /// Usage summed over all steps.
    #[must_use]
    pub fn usage(&self) -> Usage {
        self.steps
            .iter()
            .filter_map(|s| s.usage)
            .fold(Usage::zero(), |acc, u| acc + u)
    }
}

/// A fixed sequence of chat steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// Steps to run, in order.
    pub steps: Vec<ChainStep>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: ChainStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step once, piping each reply into the next step.
    ///
    /// # Errors
    ///
    /// Fails if the chain is empty, if a provider call fails, or if a step's
    /// reply has no text to pass on.
    pub async fn run<P>(&self, provider: &P, input: &str) -> Result<ChainOutput>
    where
        P: ChatProvider + ?Sized,
    {
        if self.steps.is_empty() {
            return Err(Error::chain("chain has no steps"));
        }

        let mut output = ChainOutput::default();
        let mut current = input.to_owned();

        for (index, step) in self.steps.iter().enumerate() {
            let prompt = step.render(&current);
            debug!(
                step = index + 1,
                total = self.steps.len(),
                provider = provider.provider_name(),
                "running chain step"
            );

            let response = provider.chat(&step.request(prompt.clone())).await?;
            let text = response
                .text()
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| Error::chain(format!("step {} returned no text", index + 1)))?;

            output.steps.push(StepRecord {
                prompt,
                output: text.clone(),
                usage: response.usage,
            });
            current = text;
        }

        Ok(output)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    #[test]
    fn render_replaces_every_placeholder() {
        let step = ChainStep::new("A: {input} / B: {input}");
        assert_eq!(step.render("x"), "A: x / B: x");
    }

    #[test]
    fn render_appends_when_placeholder_missing() {
        assert_eq!(ChainStep::new("Summarize:").render("text"), "Summarize:\n\ntext");
        assert_eq!(ChainStep::new("").render("text"), "text");
    }

    #[test]
    fn step_request_carries_options() {
        let step = ChainStep::new("{input}")
            .system("Be terse.")
            .model("gpt-4o-mini")
            .temperature(0.1)
            .max_tokens(20);
        let request = step.request("hello".to_owned());

        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content.as_deref(), Some("Be terse."));
        assert_eq!(request.messages[1].content.as_deref(), Some("hello"));
        assert_eq!(request.temperature, Some(0.1));
        assert_eq!(request.max_tokens, Some(20));
    }

    #[tokio::test]
    async fn pipes_each_reply_into_next_step() {
        let provider = MockProvider::new(vec!["a haiku".to_owned(), "un haïku".to_owned()]);
        let chain = Chain::new()
            .step(ChainStep::new("Write a haiku about {input}."))
            .step(ChainStep::new("Translate to French: {input}"));

        let output = chain.run(&provider, "autumn").await.unwrap();

        assert_eq!(output.output(), "un haïku");
        assert_eq!(output.steps.len(), 2);
        assert_eq!(
            provider.prompts(),
            vec![
                "Write a haiku about autumn.".to_owned(),
                "Translate to French: a haiku".to_owned()
            ]
        );
    }

    #[tokio::test]
    async fn empty_chain_is_an_error() {
        let provider = MockProvider::new(vec!["unused".to_owned()]);
        let err = Chain::new().run(&provider, "x").await.unwrap_err();
        assert!(matches!(err, Error::Chain(_)));
        assert!(provider.prompts().is_empty());
    }

    #[tokio::test]
    async fn blank_reply_stops_the_chain() {
        let provider = MockProvider::new(vec!["   ".to_owned(), "never".to_owned()]);
        let chain = Chain::new()
            .step(ChainStep::new("{input}"))
            .step(ChainStep::new("{input}"));

        let err = chain.run(&provider, "x").await.unwrap_err();
        assert!(err.to_string().contains("step 1 returned no text"));
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn usage_is_summed_across_steps() {
        let provider = MockProvider::new(vec!["one".to_owned(), "two".to_owned()]);
        let chain = Chain::new()
            .step(ChainStep::new("{input}"))
            .step(ChainStep::new("{input}"));

        let output = chain.run(&provider, "start").await.unwrap();
        let usage = output.usage();
        assert_eq!(usage.total_tokens, usage.input_tokens + usage.output_tokens);
        assert!(usage.total_tokens > 0);
    }
}
