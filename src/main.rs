//! Server entry point for the region cache.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use region_cache_core::server::{self, shutdown_signal};
use region_cache_core::{ClientConfig, Database, HttpRegionClient, RegionService, RegionStore};
use tokio::net::TcpListener;
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(
        base_url = %args.base_url,
        database = %args.database.display(),
        listen = %args.listen,
        "configuration loaded"
    );
    info!("region cache starting");

    let db = Database::new(&args.database)
        .await
        .with_context(|| format!("opening database {}", args.database.display()))?;

    // Gzip is decoded per page; reqwest must leave Content-Encoding intact.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(args.connect_timeout))
        .timeout(Duration::from_secs(args.read_timeout))
        .no_gzip()
        .build()
        .context("building HTTP client")?;

    let config = ClientConfig {
        base_url: args.base_url,
        api_key: args.api_key,
        secret_key: args.secret_key,
        customer_ip: args.customer_ip,
    };
    let client = HttpRegionClient::new(http, config);
    let store = RegionStore::new(db.clone());
    let service = Arc::new(RegionService::new(Arc::new(client), Arc::new(store)));

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("binding {}", args.listen))?;

    server::serve(listener, service, shutdown_signal()).await?;

    db.close().await;
    info!("server stopped");
    Ok(())
}
