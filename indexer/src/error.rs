//! Error types for catalog ingestion and cache building.

use thiserror::Error;

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Errors that can occur while building the keyword cache.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// Catalog source could not be read or parsed.
    #[error("catalog error: {0}")]
    Csv(#[from] csv::Error),

    /// Catalog has no column with the requested name.
    #[error("catalog has no '{0}' column")]
    MissingColumn(String),

    /// Catalog holds no keywords.
    #[error("catalog contains no keywords")]
    EmptyCatalog,

    /// Embedding or cache error.
    #[error("embedding error: {0}")]
    Embedding(#[from] cinematch_embeddings::EmbeddingError),
}
