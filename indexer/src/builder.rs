//! Batch embedding of the catalog into a keyword cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use cinematch_embeddings::{EmbeddingProvider, KeywordCache};

use crate::catalog::Catalog;
use crate::config::{BuilderConfig, PartialPolicy};
use crate::error::{IndexerError, Result};

/// Summary of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Keywords in the catalog.
    pub total: usize,

    /// Keywords that made it into the cache.
    pub embedded: usize,

    /// Keywords left out because a batch failed.
    pub dropped: usize,

    /// Embedding calls that succeeded.
    pub batches: usize,

    /// The batch error that stopped the build early, if any.
    pub failure: Option<String>,

    /// Where the cache was written.
    pub output: Option<PathBuf>,
}

impl BuildReport {
    /// Whether every catalog keyword was embedded.
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.failure.is_none()
    }
}

/// Embeds a catalog in batches and produces a [`KeywordCache`].
pub struct CacheBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    config: BuilderConfig,
}

impl CacheBuilder {
    /// Create a new builder.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: BuilderConfig) -> Self {
        Self { provider, config }
    }

    /// Effective batch size: the configured size, capped by the provider.
    pub fn batch_size(&self) -> usize {
        self.config
            .batch_size
            .min(self.provider.max_batch_size())
            .max(1)
    }

    /// Embed every keyword of `catalog`.
    ///
    /// A failed batch stops the build; no retry is attempted. Under
    /// [`PartialPolicy::AllOrNothing`] the error is returned. Under
    /// [`PartialPolicy::BestEffort`] the keywords embedded so far are kept,
    /// unless there are none, which is still an error.
    pub async fn build(&self, catalog: &Catalog) -> Result<(KeywordCache, BuildReport)> {
        if catalog.is_empty() {
            return Err(IndexerError::EmptyCatalog);
        }

        let total = catalog.len();
        let batch_size = self.batch_size();
        info!(
            "Embedding {total} keywords with {} ({}) in batches of {batch_size}",
            self.provider.name(),
            self.provider.default_model()
        );

        let mut vectors = Vec::with_capacity(total);
        let mut batches = 0;
        let mut failure = None;

        for batch in catalog.keywords().chunks(batch_size) {
            match self.provider.embed_texts(batch).await {
                Ok(batch_vectors) => {
                    vectors.extend(batch_vectors);
                    batches += 1;
                    info!("  {} / {total} keywords embedded", vectors.len());
                }
                Err(e) => {
                    error!("Embedding batch failed: {e}");
                    error!("Only {} keywords were embedded", vectors.len());
                    failure = Some(e);
                    break;
                }
            }
        }

        let failure = match failure {
            None => None,
            Some(e) if self.config.partial_policy == PartialPolicy::AllOrNothing => {
                return Err(e.into());
            }
            Some(e) if vectors.is_empty() => return Err(e.into()),
            Some(e) => Some(e.to_string()),
        };

        let embedded = vectors.len();
        let keywords = catalog.keywords()[..embedded].to_vec();
        let cache = KeywordCache::from_rows(keywords, vectors, self.provider.default_model())?
            .with_built_at(Utc::now());

        let report = BuildReport {
            total,
            embedded,
            dropped: total - embedded,
            batches,
            failure,
            output: None,
        };

        if !report.is_complete() {
            warn!(
                "Partial cache: {} keywords embedded, {} dropped",
                report.embedded, report.dropped
            );
        }

        Ok((cache, report))
    }

    /// Build the cache and write it to `path`.
    ///
    /// Nothing is written when the build fails.
    pub async fn build_and_save(
        &self,
        catalog: &Catalog,
        path: impl AsRef<Path>,
    ) -> Result<BuildReport> {
        let path = path.as_ref();
        let (cache, mut report) = self.build(catalog).await?;
        cache.save(path).await?;
        report.output = Some(path.to_path_buf());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cinematch_embeddings::{EmbeddingError, EmbeddingRequest, EmbeddingResponse};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Embeds text as `[len, first byte]` and fails from call `fail_from` on.
    struct FakeProvider {
        max_batch: usize,
        fail_from: Option<usize>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl FakeProvider {
        fn new(max_batch: usize) -> Self {
            Self {
                max_batch,
                fail_from: None,
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        fn failing_from(mut self, call: usize) -> Self {
            self.fail_from = Some(call);
            self
        }

        fn batch_sizes(&self) -> Vec<usize> {
            self.batch_sizes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn default_model(&self) -> &str {
            "fake-model"
        }

        fn default_dimension(&self) -> usize {
            2
        }

        fn max_batch_size(&self) -> usize {
            self.max_batch
        }

        async fn embed(&self, request: EmbeddingRequest) -> cinematch_embeddings::Result<EmbeddingResponse> {
            let first = request.text.bytes().next().unwrap_or(0);
            Ok(EmbeddingResponse {
                embedding: vec![request.text.len() as f32, f32::from(first)],
                model: "fake-model".to_string(),
                dimension: 2,
                tokens_used: None,
            })
        }

        async fn embed_batch(
            &self,
            requests: Vec<EmbeddingRequest>,
        ) -> cinematch_embeddings::Result<Vec<EmbeddingResponse>> {
            let call = {
                let mut sizes = self.batch_sizes.lock().unwrap();
                sizes.push(requests.len());
                sizes.len() - 1
            };
            if self.fail_from.is_some_and(|n| call >= n) {
                return Err(EmbeddingError::ApiRequest("boom".to_string()));
            }

            let mut out = Vec::with_capacity(requests.len());
            for request in requests {
                out.push(self.embed(request).await?);
            }
            Ok(out)
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_keywords(["Romance", "Family", "Horror", "Thriller", "Comedy"])
    }

    #[tokio::test]
    async fn test_builds_in_batches_preserving_order() {
        let provider = Arc::new(FakeProvider::new(2));
        let builder = CacheBuilder::new(provider.clone(), BuilderConfig::default());

        let (cache, report) = builder.build(&catalog()).await.unwrap();

        assert_eq!(provider.batch_sizes(), vec![2, 2, 1]);
        assert_eq!(cache.keywords(), catalog().keywords());
        assert_eq!(cache.len(), cache.rows().count());
        assert!(cache.rows().all(|row| row.len() == 2));
        assert_eq!(cache.row(1), Some(&[6.0, f32::from(b'F')][..]));
        assert!(report.is_complete());
        assert_eq!(report.batches, 3);
    }

    #[tokio::test]
    async fn test_configured_batch_size_is_capped_by_provider() {
        let provider = Arc::new(FakeProvider::new(3));
        let builder = CacheBuilder::new(provider, BuilderConfig::default().with_batch_size(10));
        assert_eq!(builder.batch_size(), 3);
    }

    #[tokio::test]
    async fn test_all_or_nothing_writes_nothing_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let provider = Arc::new(FakeProvider::new(2).failing_from(1));
        let builder = CacheBuilder::new(provider, BuilderConfig::default());

        let result = builder.build_and_save(&catalog(), &path).await;

        assert!(matches!(result, Err(IndexerError::Embedding(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_best_effort_persists_completed_batches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let provider = Arc::new(FakeProvider::new(2).failing_from(1));
        let config = BuilderConfig::default().with_partial_policy(PartialPolicy::BestEffort);
        let builder = CacheBuilder::new(provider, config);

        let report = builder.build_and_save(&catalog(), &path).await.unwrap();

        assert_eq!(report.embedded, 2);
        assert_eq!(report.dropped, 3);
        assert!(report.failure.is_some());
        assert!(!report.is_complete());

        let cache = KeywordCache::load(&path).await.unwrap();
        assert_eq!(cache.keywords(), &["Romance", "Family"]);
    }

    #[tokio::test]
    async fn test_best_effort_with_nothing_embedded_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let provider = Arc::new(FakeProvider::new(2).failing_from(0));
        let config = BuilderConfig::default().with_partial_policy(PartialPolicy::BestEffort);
        let builder = CacheBuilder::new(provider, config);

        assert!(builder.build_and_save(&catalog(), &path).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_catalog_is_rejected() {
        let provider = Arc::new(FakeProvider::new(2));
        let builder = CacheBuilder::new(provider.clone(), BuilderConfig::default());

        let result = builder.build(&Catalog::default()).await;
        assert!(matches!(result, Err(IndexerError::EmptyCatalog)));
        assert!(provider.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_single_keyword_catalog() {
        let provider = Arc::new(FakeProvider::new(2048));
        let builder = CacheBuilder::new(provider, BuilderConfig::default());

        let (cache, report) = builder
            .build(&Catalog::from_keywords(["Family"]))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(report.batches, 1);
    }
}
