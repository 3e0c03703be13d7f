//! Tessera HTTP upload node
//!
//! Accepts multipart uploads on `/tessera/upload`, stores the files in a
//! directory and answers with the stored-file records as JSON.
//!
//! Usage:
//!   tessera-http --port 8080 --config tessera.json

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use tessera_http::{build_router, DirectoryStore, HttpConfig, UPLOAD_URI};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "tessera-http")]
#[command(about = "Tessera multipart upload node")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve JSP-suffixed paths instead of rejecting them
    #[arg(long)]
    allow_jsp: bool,

    /// Maximum upload size, e.g. 512k, 10m
    #[arg(long)]
    max_size: Option<String>,

    /// Directory uploaded files are stored in
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn http_config(&self) -> Result<HttpConfig> {
        let mut config = match &self.config {
            Some(path) => HttpConfig::load(path).context("Failed to load config")?,
            None => HttpConfig::default(),
        };
        if self.allow_jsp {
            config.allow_jsp = true;
        }
        if let Some(max_size) = &self.max_size {
            config.upload_max_size = max_size.clone();
        }
        if let Some(dir) = &self.upload_dir {
            config.upload_dir = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Tessera HTTP starting...");
    let config = args.http_config()?;
    let store = Arc::new(DirectoryStore::new(config.upload_dir.clone()));
    let app = build_router(&config, store).context("Invalid HTTP config")?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!(
        "Listening on port {} (upload: {}, max size: {}, dir: {:?})",
        args.port, UPLOAD_URI, config.upload_max_size, config.upload_dir
    );

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
