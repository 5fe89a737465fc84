use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use recetas_proxy::config;
use recetas_proxy::notion::NotionClient;
use recetas_proxy::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file; without it only defaults and env are used
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => config::load(Some(path.as_path()))
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => config::Config::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    config::validate(&cfg)?;

    let notion = NotionClient::from_config(&cfg.notion).context("failed to build Notion client")?;
    let state = AppState::new(Arc::new(notion), cfg.recipes.clone());
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(cfg.listen_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr()))?;
    let addr = listener.local_addr()?;
    info!(port = addr.port(), %addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
