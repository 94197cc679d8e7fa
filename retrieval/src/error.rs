//! Error types for the refinement pipeline.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the refinement pipeline.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The user utterance was rejected before any provider call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding or matching error.
    #[error("embedding error: {0}")]
    Embedding(#[from] cinematch_embeddings::EmbeddingError),

    /// Completion provider has no credentials.
    #[error("completion provider not configured")]
    CompletionNotConfigured,

    /// Completion API request failed.
    #[error("completion request failed: {0}")]
    CompletionRequest(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Invalid response from the completion provider.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RetrievalError {
    /// Whether the caller sent something unusable, as opposed to the
    /// system failing to process a valid request.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
