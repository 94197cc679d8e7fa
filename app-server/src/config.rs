//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

use cinematch_retrieval::{RetrievalConfig, Strictness};

use crate::error::{ServerError, ServerResult};

/// Server settings, read from flags or the matching environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "cinematch-server", about = "Serve CineMatch keyword recommendations")]
pub struct ServerArgs {
    /// Address to bind.
    #[arg(long, env = "CINEMATCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "CINEMATCH_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Keyword cache written by `cinematch-index`.
    #[arg(long, env = "CINEMATCH_CACHE", default_value = "keyword_cache.json")]
    pub cache_path: PathBuf,

    /// Minimum cosine similarity for a candidate.
    #[arg(long, env = "CINEMATCH_THRESHOLD", default_value_t = 0.45)]
    pub threshold: f32,

    /// How recommendations are checked against the candidates: trust, warn or discard.
    #[arg(long, env = "CINEMATCH_STRICTNESS", default_value_t = Strictness::Discard)]
    pub strictness: Strictness,

    /// Embedding model. Must match the one the cache was built with.
    #[arg(long, env = "CINEMATCH_EMBEDDING_MODEL", default_value = cinematch_embeddings::DEFAULT_MODEL)]
    pub embedding_model: String,

    /// Chat model for intent expansion and filtering.
    #[arg(long, env = "CINEMATCH_COMPLETION_MODEL", default_value = "gpt-4o")]
    pub completion_model: String,

    /// Override the OpenAI API base URL.
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,
}

impl ServerArgs {
    /// Socket address from `host` and `port`.
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Pipeline settings derived from the flags.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig::default()
            .with_threshold(self.threshold)
            .with_strictness(self.strictness)
            .with_embedding_model(self.embedding_model.clone())
            .with_completion_model(self.completion_model.clone())
    }

    /// The API key, required for both providers.
    pub fn require_api_key(&self) -> ServerResult<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServerError::Config("OPENAI_API_KEY not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> ServerArgs {
        ServerArgs::try_parse_from(std::iter::once("cinematch-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--threshold",
            "0.6",
            "--strictness",
            "warn",
        ]);

        assert_eq!(args.socket_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
        let config = args.retrieval_config();
        assert_eq!(config.matcher.threshold, 0.6);
        assert_eq!(config.strictness, Strictness::Warn);
    }

    #[test]
    fn test_bad_host() {
        let args = parse(&["--host", "not an address"]);
        assert!(matches!(args.socket_addr(), Err(ServerError::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let args = parse(&["--openai-api-key", "  "]);
        assert!(args.require_api_key().is_err());

        let args = parse(&["--openai-api-key", "sk-test"]);
        assert_eq!(args.require_api_key().unwrap(), "sk-test");
    }
}
