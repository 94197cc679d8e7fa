//! Refinement pipeline implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use cinematch_embeddings::{CandidateSet, EmbeddingProvider, KeywordIndex};

use crate::completion::CompletionProvider;
use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::prompts::{expansion_request, filter_request, parse_keyword_list};
use crate::validate::apply_strictness;

/// Final answer for one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Sorted final keywords and combinations.
    pub recommended_keywords: Vec<String>,

    /// Stage 1 expansion, in generation order.
    pub llm_generated_keywords: Vec<String>,
}

/// Three-stage refinement: expand the utterance, retrieve close catalog
/// keywords, then filter and combine them.
///
/// Stages run strictly in order within one request and any provider error
/// aborts the request. The pipeline holds no per-request state, so one
/// instance serves concurrent requests.
pub struct RefinementPipeline {
    config: RetrievalConfig,
    index: Arc<KeywordIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    completer: Arc<dyn CompletionProvider>,
}

impl RefinementPipeline {
    /// Create a pipeline over a loaded index.
    pub fn new(
        config: RetrievalConfig,
        index: Arc<KeywordIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let cache_model = index.cache().model();
        if !index.is_empty() && cache_model != config.embedding_model {
            warn!(
                "Keyword cache was built with {cache_model} but queries use {}",
                config.embedding_model
            );
        }

        Ok(Self {
            config,
            index,
            embedder,
            completer,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Catalog keywords available for matching.
    pub fn catalog_size(&self) -> usize {
        self.index.len()
    }

    /// Whether both providers have credentials.
    pub fn providers_configured(&self) -> bool {
        self.embedder.is_available() && self.completer.is_available()
    }

    /// Run all three stages for `utterance`.
    ///
    /// An utterance that is empty after trimming is rejected before any
    /// provider is called. An empty expansion or an empty candidate set ends
    /// the run early with an empty recommendation rather than an error.
    pub async fn recommend(&self, utterance: &str) -> Result<Recommendation> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(RetrievalError::InvalidInput(
                "user input must not be empty".to_string(),
            ));
        }

        self.run(utterance).await.inspect_err(|e| {
            error!("Recommendation failed: {e}");
        })
    }

    async fn run(&self, utterance: &str) -> Result<Recommendation> {
        debug!("New query: {utterance}");

        let expansion = self.expand_intent(utterance).await?;
        if expansion.is_empty() {
            info!("Stage 1 produced no expansion terms");
            return Ok(Recommendation::default());
        }

        let candidates = self.retrieve_candidates(&expansion).await?;
        if candidates.is_empty() {
            info!("No candidates found in catalog");
            return Ok(Recommendation {
                recommended_keywords: Vec::new(),
                llm_generated_keywords: expansion,
            });
        }

        let recommended = self.filter_and_combine(utterance, &candidates).await?;

        Ok(Recommendation {
            recommended_keywords: recommended,
            llm_generated_keywords: expansion,
        })
    }

    /// Stage 1: expand the utterance into professional keyword phrases.
    pub async fn expand_intent(&self, utterance: &str) -> Result<Vec<String>> {
        let request = expansion_request(utterance, self.config.expansion_terms);
        let answer = self.completer.complete(request).await?;
        let expansion = parse_keyword_list(&answer);

        debug!("Stage 1 expanded keywords: {expansion:?}");
        Ok(expansion)
    }

    /// Stage 2: embed the expansion and collect close catalog keywords.
    pub async fn retrieve_candidates(&self, expansion: &[String]) -> Result<CandidateSet> {
        // Nothing can match an empty catalog, so skip the embedding call.
        if expansion.is_empty() || self.index.is_empty() {
            return Ok(CandidateSet::new());
        }

        let queries = self.embedder.embed_texts(expansion).await?;
        let candidates = self.index.match_queries(&queries, &self.config.matcher)?;

        debug!(
            "Stage 2 found {} candidates: {:?}",
            candidates.len(),
            candidates.iter().collect::<Vec<_>>()
        );
        Ok(candidates)
    }

    /// Stage 3: choose and combine candidates covering the whole intent.
    ///
    /// The answer is checked against `candidates` per the configured
    /// strictness, then sorted and deduplicated.
    pub async fn filter_and_combine(
        &self,
        utterance: &str,
        candidates: &CandidateSet,
    ) -> Result<Vec<String>> {
        let request = filter_request(
            utterance,
            candidates,
            self.config.min_results,
            self.config.max_results,
        );
        let answer = self.completer.complete(request).await?;

        let items = parse_keyword_list(&answer);
        let mut recommended = apply_strictness(items, candidates, self.config.strictness);
        recommended.sort();
        recommended.dedup();

        debug!("Stage 3 recommended keywords: {recommended:?}");
        Ok(recommended)
    }
}
