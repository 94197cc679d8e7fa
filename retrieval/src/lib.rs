//! # Keyword Refinement
//!
//! Turns a free-text request into catalog keywords in three stages:
//!
//! 1. **Intent expansion**: a chat model rewrites the utterance as
//!    professional genre and tone phrases.
//! 2. **Candidate retrieval**: the phrases are embedded and matched against
//!    the precomputed keyword cache.
//! 3. **Filter and combine**: the chat model keeps only candidates that cover
//!    the whole intent, joining two when one alone falls short.
//!
//! ```text
//!  utterance ──▶ expand ──▶ embed + match ──▶ filter/combine ──▶ keywords
//!                  │             │                  │
//!             completion     KeywordIndex       completion
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cinematch_retrieval::{RefinementPipeline, RetrievalConfig};
//!
//! let pipeline = RefinementPipeline::new(config, index, embedder, completer)?;
//! let result = pipeline.recommend("feel-good family film").await?;
//! ```

pub mod completion;
pub mod config;
pub mod engine;
pub mod error;
pub mod prompts;
pub mod validate;

pub use completion::{CompletionProvider, CompletionRequest, OpenAIChatProvider};
pub use config::{RetrievalConfig, Strictness};
pub use engine::{Recommendation, RefinementPipeline};
pub use error::{Result, RetrievalError};
pub use prompts::COMBINATION_CONNECTOR;
pub use validate::{ValidatedItem, apply_strictness, classify};

// Re-export from dependencies for convenience
pub use cinematch_embeddings::{CandidateSet, EmbeddingProvider, KeywordCache, KeywordIndex};
