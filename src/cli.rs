//! CLI commands for dudley-scores.
//!
//! Runs the API server, a one-off live crawl, or prints the sample dataset.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::sample::sample_dataset;
use crate::scraper::{Chromium, Crawler};
use crate::types::Dataset;

#[derive(Parser)]
#[command(name = "dudley-scores")]
#[command(version, about = "Dudley Redhead JRLFC fixtures and results service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Crawl the club's competitions once and print the dataset
    Scrape {
        /// Browser DevTools websocket (overrides configuration)
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the fallback sample dataset
    Sample,
}

/// Run one live crawl. Fails instead of falling back to sample data.
pub async fn run_scrape(endpoint: Option<String>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if endpoint.is_some() {
        config.scrape.endpoint = endpoint;
    }

    let Some(endpoint) = config.scrape.endpoint() else {
        anyhow::bail!("No browser endpoint: pass --endpoint or set BROWSERLESS_WS");
    };

    eprintln!("Crawling club: {}", config.scrape.club_slug);
    let crawler = Crawler::new(Arc::new(Chromium), &config.scrape);
    let dataset = crawler
        .crawl(
            endpoint,
            &config.scrape.club_slug,
            config.scrape.season,
            &config.scrape.timezone,
        )
        .await?;
    eprintln!(
        "Found {} upcoming, {} results",
        dataset.upcoming.len(),
        dataset.results.len()
    );

    write_dataset(&dataset, output)
}

/// Print the sample dataset for the configured season.
pub fn run_sample() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    write_dataset(&sample_dataset(config.scrape.season), None)
}

fn write_dataset(dataset: &Dataset, output: Option<PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(dataset)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
