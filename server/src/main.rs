use anyhow::{Context, Result};
use clap::Parser;
use server::build_app;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Local retrieval service; admin endpoints need `ADMIN_TOKEN`, CORS reads `CORS_ALLOW_ORIGIN`.
#[derive(Parser)]
#[command(name = "server", about = "Serve TF-IDF file retrieval over HTTP")]
struct Args {
    /// Index directory holding a cached state.json to restore at startup
    #[arg(long)]
    index: Option<String>,
    /// Address to bind; loopback by default since the index holds project source
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let listener = TcpListener::bind(args.bind).await.with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(addr = %args.bind, "server listening");
    axum::serve(listener, build_app(args.index)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
