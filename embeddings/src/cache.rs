//! Persisted keyword embedding cache.
//!
//! The cache pairs the catalog's keyword list with a matrix whose row `i`
//! is the embedding of keyword `i`. It is written once by the offline
//! builder and loaded read-only when the server starts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// On-disk representation of the cache.
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    model: String,
    dimension: usize,
    built_at: Option<DateTime<Utc>>,
    keywords: Vec<String>,
    vectors: Vec<Embedding>,
}

/// Keyword list plus a contiguous row-major embedding matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordCache {
    keywords: Vec<String>,
    vectors: Vec<f32>,
    dimension: usize,
    model: String,
    built_at: Option<DateTime<Utc>>,
}

impl KeywordCache {
    /// A cache with no keywords.
    pub fn empty() -> Self {
        Self {
            keywords: Vec::new(),
            vectors: Vec::new(),
            dimension: 0,
            model: String::new(),
            built_at: None,
        }
    }

    /// Build a cache from parallel keyword and embedding lists.
    ///
    /// Keywords must be unique and every row must share one dimensionality.
    pub fn from_rows(
        keywords: Vec<String>,
        rows: Vec<Embedding>,
        model: impl Into<String>,
    ) -> Result<Self> {
        if keywords.len() != rows.len() {
            return Err(EmbeddingError::CorruptCache(format!(
                "{} keywords but {} vectors",
                keywords.len(),
                rows.len()
            )));
        }

        let mut seen = HashSet::with_capacity(keywords.len());
        for keyword in &keywords {
            if !seen.insert(keyword.as_str()) {
                return Err(EmbeddingError::CorruptCache(format!(
                    "duplicate keyword: {keyword}"
                )));
            }
        }

        let dimension = rows.first().map_or(0, Vec::len);
        if !rows.is_empty() && dimension == 0 {
            return Err(EmbeddingError::CorruptCache(
                "zero-length embedding".to_string(),
            ));
        }

        let mut vectors = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            if row.len() != dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            vectors.extend(row);
        }

        Ok(Self {
            keywords,
            vectors,
            dimension,
            model: model.into(),
            built_at: None,
        })
    }

    /// Stamp the build time.
    pub fn with_built_at(mut self, built_at: DateTime<Utc>) -> Self {
        self.built_at = Some(built_at);
        self
    }

    /// Number of keywords in the cache.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Width of every row, 0 for an empty cache.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model the rows were produced with.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    /// Keywords in row order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Embedding row for keyword `i`.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i >= self.keywords.len() {
            return None;
        }
        let start = i * self.dimension;
        self.vectors.get(start..start + self.dimension)
    }

    /// All rows in catalog order.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    /// Serialize to the JSON artifact format.
    pub fn to_json(&self) -> Result<String> {
        let file = CacheFile {
            model: self.model.clone(),
            dimension: self.dimension,
            built_at: self.built_at,
            keywords: self.keywords.clone(),
            vectors: self.rows().map(<[f32]>::to_vec).collect(),
        };
        Ok(serde_json::to_string(&file)?)
    }

    /// Parse and validate the JSON artifact format.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CacheFile = serde_json::from_str(json)?;
        let declared = file.dimension;

        let mut cache = Self::from_rows(file.keywords, file.vectors, file.model)?;
        if !cache.is_empty() && cache.dimension != declared {
            return Err(EmbeddingError::DimensionMismatch {
                expected: declared,
                actual: cache.dimension,
            });
        }
        cache.built_at = file.built_at;
        Ok(cache)
    }

    /// Write the cache to `path`.
    ///
    /// The artifact is written to a sibling temporary file first and then
    /// renamed into place.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_json()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp = temp_path(path);
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, path).await?;

        info!(
            "Wrote keyword cache with {} entries to {}",
            self.len(),
            path.display()
        );
        Ok(())
    }

    /// Load the cache from `path`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let cache = Self::from_json(&content)?;
        debug!(
            "Loaded {} keywords ({} dims, model {}) from {}",
            cache.len(),
            cache.dimension,
            cache.model,
            path.display()
        );
        Ok(cache)
    }

    /// Load the cache, falling back to an empty one if it is absent or corrupt.
    pub async fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path).await {
            Ok(cache) => {
                info!("Keyword cache loaded: {} keywords ready", cache.len());
                cache
            }
            Err(e) => {
                warn!(
                    "Keyword cache at {} unavailable ({e}); serving with an empty catalog",
                    path.display()
                );
                Self::empty()
            }
        }
    }
}

impl Default for KeywordCache {
    fn default() -> Self {
        Self::empty()
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
