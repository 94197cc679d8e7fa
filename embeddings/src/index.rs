//! Similarity matcher over the loaded keyword cache.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::cache::KeywordCache;
use crate::error::{EmbeddingError, Result};
use crate::similarity::{SimilarityResult, cosine_from_parts, dot_f64, squared_norm, top_k};

/// Tunables for candidate selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum cosine similarity a keyword needs to become a candidate.
    pub threshold: f32,

    /// How many of the closest keywords each query may contribute.
    pub top_k: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.45,
            top_k: 5,
        }
    }
}

/// Deduplicated catalog keywords close to at least one query.
///
/// Carries no ranking; iteration order is lexicographic so that anything
/// rendered from it is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet(BTreeSet<String>);

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keyword; returns false if it was already present.
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        self.0.insert(keyword.into())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Read-only index over the keyword cache.
///
/// Squared row norms are computed once at construction and a keyword-to-row
/// map gives constant-time lookup by keyword. Matching never mutates the
/// index, so one instance can be shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    cache: KeywordCache,
    squared_norms: Vec<f64>,
    positions: HashMap<String, usize>,
}

impl KeywordIndex {
    /// Build the index from a loaded cache.
    pub fn new(cache: KeywordCache) -> Self {
        let squared_norms = cache.rows().map(squared_norm).collect();
        let positions = cache
            .keywords()
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();

        Self {
            cache,
            squared_norms,
            positions,
        }
    }

    /// Index with no keywords.
    pub fn empty() -> Self {
        Self::new(KeywordCache::empty())
    }

    /// Number of catalog keywords.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.cache.dimension()
    }

    /// The underlying cache.
    pub fn cache(&self) -> &KeywordCache {
        &self.cache
    }

    /// Row of `keyword`, if it is in the catalog.
    pub fn position(&self, keyword: &str) -> Option<usize> {
        self.positions.get(keyword).copied()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.positions.contains_key(keyword)
    }

    /// Cached embedding of `keyword`.
    pub fn embedding_of(&self, keyword: &str) -> Option<&[f32]> {
        self.position(keyword).and_then(|i| self.cache.row(i))
    }

    /// Cosine similarity of `query` against every catalog row, in catalog order.
    pub fn scores(&self, query: &[f32]) -> Result<Vec<f32>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }

        let query_norm = squared_norm(query);
        self.cache
            .rows()
            .zip(&self.squared_norms)
            .map(|(row, &row_norm)| {
                Ok(cosine_from_parts(
                    dot_f64(query, row)?,
                    query_norm,
                    row_norm,
                ))
            })
            .collect()
    }

    /// Closest keywords to a single query, best first.
    ///
    /// Takes the `top_k` highest-scoring rows (ties go to the lower row) and
    /// keeps those at or above the threshold.
    pub fn search(&self, query: &[f32], config: &MatcherConfig) -> Result<Vec<SimilarityResult>> {
        let scores = self.scores(query)?;

        Ok(top_k(&scores, config.top_k)
            .into_iter()
            .filter(|&i| scores[i] >= config.threshold)
            .map(|i| SimilarityResult::new(i, self.cache.keywords()[i].clone(), scores[i]))
            .collect())
    }

    /// Union of [`search`](Self::search) over every query.
    pub fn match_queries(
        &self,
        queries: &[Embedding],
        config: &MatcherConfig,
    ) -> Result<CandidateSet> {
        let mut candidates = CandidateSet::new();

        for (i, query) in queries.iter().enumerate() {
            let hits = self.search(query, config)?;
            debug!("Query {i} matched {} keywords", hits.len());
            for hit in hits {
                candidates.insert(hit.keyword);
            }
        }

        Ok(candidates)
    }
}

impl Default for KeywordIndex {
    fn default() -> Self {
        Self::empty()
    }
}
