//! Configuration for the refinement pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cinematch_embeddings::MatcherConfig;

use crate::error::{Result, RetrievalError};

/// Configuration for the refinement pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidate selection in stage 2.
    pub matcher: MatcherConfig,

    /// Number of expansion terms requested in stage 1.
    pub expansion_terms: usize,

    /// Fewest final keywords requested in stage 3.
    pub min_results: usize,

    /// Most final keywords requested in stage 3.
    pub max_results: usize,

    /// How stage 3 output is checked against the candidate set.
    pub strictness: Strictness,

    /// Chat model for stages 1 and 3.
    pub completion_model: String,

    /// Embedding model for stage 2 queries. Must match the cache.
    pub embedding_model: String,
}

impl RetrievalConfig {
    /// Set the matcher configuration.
    pub fn with_matcher(mut self, matcher: MatcherConfig) -> Self {
        self.matcher = matcher;
        self
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.matcher.threshold = threshold;
        self
    }

    /// Set the stage 3 strictness.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the completion model.
    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.matcher.threshold;
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(RetrievalError::Config(format!(
                "threshold {threshold} outside [-1, 1]"
            )));
        }
        if self.matcher.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be at least 1".to_string()));
        }
        if self.expansion_terms == 0 {
            return Err(RetrievalError::Config(
                "expansion_terms must be at least 1".to_string(),
            ));
        }
        if self.min_results == 0 || self.min_results > self.max_results {
            return Err(RetrievalError::Config(format!(
                "invalid result range {}-{}",
                self.min_results, self.max_results
            )));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            expansion_terms: 10,
            min_results: 5,
            max_results: 8,
            strictness: Strictness::default(),
            completion_model: "gpt-4o".to_string(),
            embedding_model: cinematch_embeddings::DEFAULT_MODEL.to_string(),
        }
    }
}

/// How stage 3 output is checked against the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Return the model's items unchecked.
    Trust,
    /// Keep every item but log those not built from candidates.
    Warn,
    /// Drop items not built from candidates.
    #[default]
    Discard,
}

impl FromStr for Strictness {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trust" => Ok(Self::Trust),
            "warn" => Ok(Self::Warn),
            "discard" => Ok(Self::Discard),
            other => Err(RetrievalError::Config(format!(
                "unknown strictness '{other}' (expected trust, warn or discard)"
            ))),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trust => "trust",
            Self::Warn => "warn",
            Self::Discard => "discard",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.matcher.threshold, 0.45);
        assert_eq!(config.matcher.top_k, 5);
        assert_eq!(config.expansion_terms, 10);
        assert_eq!((config.min_results, config.max_results), (5, 8));
        assert_eq!(config.strictness, Strictness::Discard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let config = RetrievalConfig::default().with_threshold(1.5);
        assert!(matches!(config.validate(), Err(RetrievalError::Config(_))));
    }

    #[test]
    fn test_strictness_parse() {
        assert_eq!("Warn".parse::<Strictness>().unwrap(), Strictness::Warn);
        assert_eq!(Strictness::Trust.to_string(), "trust");
        assert!("lenient".parse::<Strictness>().is_err());
    }
}
