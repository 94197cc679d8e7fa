//! Server initialization and routing

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use cinematch_embeddings::{KeywordCache, KeywordIndex, OpenAIProvider};
use cinematch_retrieval::{OpenAIChatProvider, RefinementPipeline};

use crate::config::ServerArgs;
use crate::routes::{health, recommend, root};
use crate::state::AppState;

/// Build the Axum router with all routes and middleware
///
/// CORS is permissive so a separately hosted front-end can call the API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health::health_check))
        .route("/recommend", post(recommend::recommend))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the CineMatch HTTP server
///
/// Loads the keyword cache once, wires both OpenAI providers into the
/// pipeline and serves until SIGTERM or Ctrl+C. A missing API key is fatal;
/// a missing or unreadable cache is not, the server then answers every
/// request with an empty recommendation.
pub async fn start_server(args: ServerArgs) -> anyhow::Result<()> {
    let api_key = args.require_api_key()?.to_string();
    let addr = args.socket_addr()?;

    let cache = KeywordCache::load_or_empty(&args.cache_path).await;
    tracing::info!(
        "Loaded {} keywords from {}",
        cache.len(),
        args.cache_path.display()
    );

    let mut embedder = OpenAIProvider::new()
        .with_api_key(api_key.clone())
        .with_model(args.embedding_model.clone());
    let mut completer = OpenAIChatProvider::new()
        .with_api_key(api_key)
        .with_model(args.completion_model.clone());
    if let Some(url) = &args.openai_base_url {
        embedder = embedder.with_base_url(url.clone());
        completer = completer.with_base_url(url.clone());
    }

    let pipeline = RefinementPipeline::new(
        args.retrieval_config(),
        Arc::new(KeywordIndex::new(cache)),
        Arc::new(embedder),
        Arc::new(completer),
    )
    .context("invalid pipeline configuration")?;

    let app = build_router(AppState::new(pipeline));

    tracing::info!(
        "Starting CineMatch server on {addr} (threshold {}, strictness {})",
        args.threshold,
        args.strictness
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
