//! Content moderation types and provider trait.
//!
//! The moderation endpoint scores input text against a set of policy
//! categories. Category maps are kept as returned so categories added by the
//! provider later are not lost; [`ModerationCategory`] names the documented ones.
//!
//! # Example
//!
//! ```rust,ignore
//! use genlab::prelude::*;
//!
//! let response = provider
//!     .moderate(&ModerationRequest::new("I want to hurt them."))
//!     .await?;
//! if response.flagged() {
//!     println!("flagged for: {:?}", response.results[0].flagged_categories());
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Documented moderation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModerationCategory {
    /// Hate based on protected attributes.
    Hate,
    /// Hateful content that also includes violence or serious harm.
    HateThreatening,
    /// Harassing language towards any target.
    Harassment,
    /// Harassment that also includes violence or serious harm.
    HarassmentThreatening,
    /// Promotion or depiction of self-harm.
    SelfHarm,
    /// Expressed intent to self-harm.
    SelfHarmIntent,
    /// Instructions for self-harm.
    SelfHarmInstructions,
    /// Sexual content.
    Sexual,
    /// Sexual content involving minors.
    SexualMinors,
    /// Violence.
    Violence,
    /// Graphic depiction of violence.
    ViolenceGraphic,
    /// Advice or instruction for wrongdoing.
    Illicit,
    /// Illicit content that also references violence or weapons.
    IllicitViolent,
}

impl ModerationCategory {
    /// All documented categories.
    pub const ALL: [Self; 13] = [
        Self::Hate,
        Self::HateThreatening,
        Self::Harassment,
        Self::HarassmentThreatening,
        Self::SelfHarm,
        Self::SelfHarmIntent,
        Self::SelfHarmInstructions,
        Self::Sexual,
        Self::SexualMinors,
        Self::Violence,
        Self::ViolenceGraphic,
        Self::Illicit,
        Self::IllicitViolent,
    ];

    /// Returns the key used in the response maps.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hate => "hate",
            Self::HateThreatening => "hate/threatening",
            Self::Harassment => "harassment",
            Self::HarassmentThreatening => "harassment/threatening",
            Self::SelfHarm => "self-harm",
            Self::SelfHarmIntent => "self-harm/intent",
            Self::SelfHarmInstructions => "self-harm/instructions",
            Self::Sexual => "sexual",
            Self::SexualMinors => "sexual/minors",
            Self::Violence => "violence",
            Self::ViolenceGraphic => "violence/graphic",
            Self::Illicit => "illicit",
            Self::IllicitViolent => "illicit/violent",
        }
    }

    /// Look up a category by its response key.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == key)
    }
}

impl std::fmt::Display for ModerationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A moderation request for one or more input texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationRequest {
    /// Model identifier. Empty means the provider's default moderation model.
    #[serde(default)]
    pub model: String,
    /// Texts to classify; one result is returned per input.
    pub input: Vec<String>,
}

impl ModerationRequest {
    /// Creates a request for a single text.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            input: vec![input.into()],
        }
    }

    /// Creates a request for several texts.
    #[must_use]
    pub fn batch<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model: String::new(),
            input: inputs.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Classification of a single input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether any category was flagged.
    pub flagged: bool,
    /// Per-category flags keyed by category name.
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Per-category confidence scores keyed by category name.
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

impl ModerationResult {
    /// Returns whether the given category was flagged.
    #[must_use]
    pub fn is_flagged(&self, category: ModerationCategory) -> bool {
        self.categories
            .get(category.as_str())
            .copied()
            .unwrap_or(false)
    }

    /// Returns the score of the given category, if present.
    #[must_use]
    pub fn score(&self, category: ModerationCategory) -> Option<f64> {
        self.category_scores.get(category.as_str()).copied()
    }

    /// Names of all flagged categories, including ones not in [`ModerationCategory`].
    #[must_use]
    pub fn flagged_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|(_, flagged)| **flagged)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The category with the highest score.
    #[must_use]
    pub fn top_category(&self) -> Option<(&str, f64)> {
        self.category_scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, score)| (name.as_str(), *score))
    }
}

/// A moderation response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResponse {
    /// Unique moderation ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that produced the classification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// One result per input, in input order.
    pub results: Vec<ModerationResult>,
}

impl ModerationResponse {
    /// Returns `true` if any input was flagged.
    #[must_use]
    pub fn flagged(&self) -> bool {
        self.results.iter().any(|r| r.flagged)
    }

    /// Returns the first result (the one for a single-input request).
    #[must_use]
    pub fn first(&self) -> Option<&ModerationResult> {
        self.results.first()
    }
}

/// Trait for providers that support content moderation.
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    /// Classify the request's inputs.
    async fn moderate(&self, request: &ModerationRequest) -> Result<ModerationResponse>;

    /// Get the default moderation model for this provider.
    fn default_moderation_model(&self) -> &str;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_result() -> ModerationResult {
        serde_json::from_value(serde_json::json!({
            "flagged": true,
            "categories": {
                "hate": false,
                "harassment": true,
                "violence": true,
                "self-harm": false,
                "brand-new-category": true
            },
            "category_scores": {
                "hate": 0.01,
                "harassment": 0.62,
                "violence": 0.97,
                "self-harm": 0.0001
            }
        }))
        .unwrap()
    }

    #[test]
    fn category_keys_round_trip() {
        for category in ModerationCategory::ALL {
            assert_eq!(ModerationCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ModerationCategory::parse("unknown"), None);
    }

    #[test]
    fn result_lookups() {
        let result = sample_result();
        assert!(result.is_flagged(ModerationCategory::Violence));
        assert!(!result.is_flagged(ModerationCategory::Hate));
        assert!(!result.is_flagged(ModerationCategory::Sexual));
        assert_eq!(result.score(ModerationCategory::Harassment), Some(0.62));
        assert_eq!(result.score(ModerationCategory::Sexual), None);
    }

    #[test]
    fn flagged_categories_keeps_unknown_keys() {
        let result = sample_result();
        assert_eq!(
            result.flagged_categories(),
            vec!["brand-new-category", "harassment", "violence"]
        );
    }

    #[test]
    fn top_category_is_highest_score() {
        let result = sample_result();
        let (name, score) = result.top_category().unwrap();
        assert_eq!(name, "violence");
        assert!((score - 0.97).abs() < f64::EPSILON);
        assert!(ModerationResult::default().top_category().is_none());
    }

    #[test]
    fn batch_request_keeps_order() {
        let req = ModerationRequest::batch(["first", "second"]).model("omni-moderation-latest");
        assert_eq!(req.input, vec!["first", "second"]);
        assert_eq!(req.model, "omni-moderation-latest");
    }

    #[test]
    fn response_flagged_if_any_result_flagged() {
        let response = ModerationResponse {
            id: None,
            model: None,
            results: vec![ModerationResult::default(), sample_result()],
        };
        assert!(response.flagged());
        assert!(!response.first().unwrap().flagged);
        assert!(!ModerationResponse::default().flagged());
    }
}
