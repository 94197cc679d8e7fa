//! `cinematch-index`: embed the keyword catalog into the server's cache.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinematch_embeddings::OpenAIProvider;
use cinematch_indexer::{BuilderConfig, CacheBuilder, Catalog, PartialPolicy};

#[derive(Debug, Parser)]
#[command(name = "cinematch-index", about = "Build the CineMatch keyword embedding cache")]
struct Args {
    /// CSV file holding the keyword catalog.
    #[arg(long, env = "CINEMATCH_CATALOG", default_value = "data/movies_keywords.csv")]
    catalog: PathBuf,

    /// Name of the CSV column with the keywords.
    #[arg(long, default_value = "keyword")]
    column: String,

    /// Where to write the cache.
    #[arg(long, env = "CINEMATCH_CACHE", default_value = "keyword_cache.json")]
    output: PathBuf,

    /// Keywords per embedding request.
    #[arg(long, default_value_t = BuilderConfig::default().batch_size)]
    batch_size: usize,

    /// Keep the keywords embedded before a failed batch instead of writing nothing.
    #[arg(long)]
    allow_partial: bool,

    /// Embedding model.
    #[arg(long, env = "CINEMATCH_EMBEDDING_MODEL", default_value = cinematch_embeddings::DEFAULT_MODEL)]
    embedding_model: String,

    /// Override the OpenAI API base URL.
    #[arg(long, env = "OPENAI_BASE_URL")]
    openai_base_url: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let Some(api_key) = args.openai_api_key else {
        bail!("OPENAI_API_KEY not found");
    };

    let mut provider = OpenAIProvider::new()
        .with_api_key(api_key)
        .with_model(args.embedding_model);
    if let Some(url) = args.openai_base_url {
        provider = provider.with_base_url(url);
    }

    let catalog = Catalog::from_csv(&args.catalog, &args.column)
        .with_context(|| format!("failed to read catalog {}", args.catalog.display()))?;

    let policy = if args.allow_partial {
        PartialPolicy::BestEffort
    } else {
        PartialPolicy::AllOrNothing
    };
    let config = BuilderConfig::default()
        .with_batch_size(args.batch_size)
        .with_partial_policy(policy);

    let builder = CacheBuilder::new(Arc::new(provider), config);
    let report = builder
        .build_and_save(&catalog, &args.output)
        .await
        .context("failed to build keyword cache")?;

    if let Some(failure) = &report.failure {
        info!(
            "Cache written with {} of {} keywords ({} dropped after: {failure})",
            report.embedded, report.total, report.dropped
        );
    } else {
        info!(
            "Cache file '{}' created with {} keywords",
            args.output.display(),
            report.embedded
        );
    }

    Ok(())
}
