use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reelswipe_common::observability::init_logging;
use reelswipe_config::{ReelSwipeConfig, ReelSwipeConfigLoader};
use reelswipe_providers::ProviderSet;
use reelswipe_server::{AppState, app};
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(name = "reelswipe", about = "Short-video aggregation backend")]
struct Cli {
    /// YAML config file; skipped if it does not exist
    #[arg(short, long, default_value = "reelswipe.yaml")]
    config: PathBuf,

    /// Overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Overrides `server.static_dir`
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg: ReelSwipeConfig = ReelSwipeConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }
    if let Some(dir) = cli.static_dir {
        cfg.server.static_dir = Some(dir);
    }

    let log_path = init_logging(cfg.logging.to_log_config())?;
    tracing::info!(log_path = %log_path.display(), "app.logging.ready");

    let providers = ProviderSet::from_config(&cfg)?;
    let state = AppState::new(providers, cfg.server.app_name.clone());
    let router = app(state, cfg.server.static_dir.as_deref());

    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port))
        .await
        .with_context(|| format!("binding {}:{}", cfg.server.host, cfg.server.port))?;
    let addr: SocketAddr = listener.local_addr()?;

    tracing::info!(%addr, port = cfg.server.port, "ReelSwipe running on port {}", cfg.server.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("app.shutdown");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "app.signal.failed");
    }
}
