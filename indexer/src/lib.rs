//! # Indexer
//!
//! Offline side of CineMatch: reads the keyword catalog and embeds every
//! keyword once into the [`KeywordCache`](cinematch_embeddings::KeywordCache)
//! the server loads at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cinematch_embeddings::OpenAIProvider;
//! use cinematch_indexer::{BuilderConfig, CacheBuilder, Catalog};
//!
//! let catalog = Catalog::from_csv("data/movies_keywords.csv", "keyword")?;
//! let builder = CacheBuilder::new(Arc::new(OpenAIProvider::from_env()), BuilderConfig::default());
//! let report = builder.build_and_save(&catalog, "keyword_cache.json").await?;
//! ```

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;

pub use builder::{BuildReport, CacheBuilder};
pub use catalog::Catalog;
pub use config::{BuilderConfig, PartialPolicy};
pub use error::{IndexerError, Result};
