//! # Embeddings
//!
//! This crate provides the vector side of CineMatch keyword retrieval:
//! embedding generation, the persisted keyword embedding cache, and the
//! similarity matcher that turns query vectors into catalog candidates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► KeywordCache              │
//! │       │                    │              │                     │
//! │       ▼                    ▼              ▼                     │
//! │    OpenAI           cosine / top-k    KeywordIndex              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;

pub use cache::KeywordCache;
pub use error::{EmbeddingError, Result};
pub use index::{CandidateSet, KeywordIndex, MatcherConfig};
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};
pub use similarity::{SimilarityResult, cosine_similarity, top_k};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Dimension of embeddings (varies by model).
pub const DEFAULT_DIMENSION: usize = 1536; // OpenAI text-embedding-3-small

/// Default embedding model used for both the catalog and queries.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
