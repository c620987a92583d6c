//! Dudley Redhead JRLFC scores service
//!
//! Crawls the club's competition pages through a remote browser and serves
//! fixtures and results over HTTP, with a CLI for one-off crawls.

mod cli;
mod config;
mod error;
mod retry;
mod routes;
mod sample;
mod scraper;
mod service;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::routes::AppState;
use crate::scraper::{Chromium, Crawler, GamesCache};
use crate::service::GamesService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Scrape { endpoint, output } => {
            init_tracing("dudley_scores=info");
            cli::run_scrape(endpoint, output).await
        }
        Commands::Sample => cli::run_sample(),
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run the API server.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    init_tracing("dudley_scores=debug,tower_http=debug");

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    match config.scrape.endpoint() {
        Some(_) => tracing::info!("Browser endpoint configured, club: {}", config.scrape.club_slug),
        None => tracing::warn!("No browser endpoint configured, /games will serve sample data"),
    }

    let cache = Arc::new(GamesCache::new(chrono::Duration::seconds(
        config.cache.max_age_secs,
    )));
    tracing::info!("Cache freshness window: {}s", cache.max_age().num_seconds());
    let crawler = Crawler::new(Arc::new(Chromium), &config.scrape);
    let games = GamesService::new(crawler, config.scrape.clone(), cache);

    let app = routes::router(Arc::new(AppState { games }));

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
