//! Token usage reported by completion and chat endpoints.
//!
//! The wire object uses `prompt_tokens` / `completion_tokens` / `total_tokens`;
//! [`Usage`] accepts those names as aliases so it can be deserialized straight
//! from a response body.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Token usage statistics from a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the input/prompt.
    #[serde(default, alias = "prompt_tokens")]
    pub input_tokens: u32,

    /// Number of tokens in the output/completion.
    #[serde(default, alias = "completion_tokens")]
    pub output_tokens: u32,

    /// Total tokens used (input + output).
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Create a new usage record.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }

    /// Create an empty usage record.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Check if usage is empty (no tokens used).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.input_tokens == 0 && self.output_tokens == 0 && self.total_tokens == 0
    }
}

impl Add for Usage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input_tokens: self.input_tokens.saturating_add(rhs.input_tokens),
            output_tokens: self.output_tokens.saturating_add(rhs.output_tokens),
            total_tokens: self.total_tokens.saturating_add(rhs.total_tokens),
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::fmt::Display for Usage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} prompt + {} completion = {} tokens",
            self.input_tokens, self.output_tokens, self.total_tokens
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_computes_total() {
        let usage = Usage::new(10, 5);
        assert_eq!(usage.total_tokens, 15);
        assert!(!usage.is_empty());
        assert!(Usage::zero().is_empty());
    }

    #[test]
    fn deserializes_openai_field_names() {
        let json = r#"{"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}"#;
        let usage: Usage = serde_json::from_str(json).unwrap();
        assert_eq!(usage, Usage::new(12, 7));
    }

    #[test]
    fn new_saturates_total() {
        let usage = Usage::new(u32::MAX, 5);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(usage.input_tokens, u32::MAX);
        assert_eq!(usage.output_tokens, 5);
    }

    #[test]
    fn add_assign_accumulates() {
        let mut total = Usage::zero();
        total += Usage::new(3, 4);
        total += Usage::new(1, 2);
        assert_eq!(total, Usage::new(4, 6));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(
            Usage::new(2, 3).to_string(),
            "2 prompt + 3 completion = 5 tokens"
        );
    }
}
