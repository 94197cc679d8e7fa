//! Configuration for the cache builder.

use serde::{Deserialize, Serialize};

use cinematch_embeddings::provider::OPENAI_MAX_BATCH_SIZE;

/// Configuration for building the keyword cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Keywords per embedding call, capped by the provider's own maximum.
    pub batch_size: usize,

    /// What to persist when a batch fails partway through the catalog.
    pub partial_policy: PartialPolicy,
}

impl BuilderConfig {
    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the partial-failure policy.
    pub fn with_partial_policy(mut self, policy: PartialPolicy) -> Self {
        self.partial_policy = policy;
        self
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            batch_size: OPENAI_MAX_BATCH_SIZE,
            partial_policy: PartialPolicy::AllOrNothing,
        }
    }
}

/// How the builder reacts to a failed embedding batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialPolicy {
    /// Fail the build and leave any existing cache untouched.
    #[default]
    AllOrNothing,
    /// Persist the keywords embedded before the failure.
    BestEffort,
}
