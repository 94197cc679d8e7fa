//! CineMatch server: serves keyword recommendations over HTTP.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinematch_server::ServerArgs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = ServerArgs::parse();
    cinematch_server::start_server(args).await
}
