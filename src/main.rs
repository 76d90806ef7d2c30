//! Design-Lens command-line entry point
//!
//! Crawls a site, runs extraction and prints the session and the extraction
//! result as JSON. Logs go to stderr so stdout carries only the result.

use anyhow::{bail, Context, Result};
use clap::Parser;
use design_lens::config::{load_config, validate, Config, CrawlConfig};
use design_lens::crawler::{CrawlSession, Crawler};
use design_lens::extraction::{extract_with, DetectorTables, ExtractionResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Design-Lens: infers a site's front-end design system from its markup and CSS
///
/// Crawls a few pages from a seed URL, one request at a time, and reports the
/// technology stack, design tokens, component families, accessibility
/// signals and layout metadata it can recover from static text.
#[derive(Parser, Debug)]
#[command(name = "design-lens")]
#[command(version = "1.0.0")]
#[command(about = "Infers a site's design system from static HTML and CSS", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "url")]
    config: Option<PathBuf>,

    /// Seed URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of pages to crawl (1-20)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Follow links to other origins
    #[arg(long)]
    cross_origin: bool,

    /// Do not fetch external stylesheets
    #[arg(long)]
    skip_stylesheets: bool,

    /// Write the JSON result to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    session: &'a CrawlSession,
    extraction: &'a ExtractionResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    let tables = match &config.detectors.table {
        Some(path) => DetectorTables::load(Path::new(path))
            .with_context(|| format!("Failed to load detector table {}", path))?,
        None => DetectorTables::builtin().clone(),
    };

    let crawler = Crawler::new(config.crawl, config.fetch).context("Failed to start crawl")?;
    let session = crawler.run().await;
    let extraction = extract_with(&session, &tables);

    for risk in &extraction.risks {
        tracing::warn!("Risk: {}", risk);
    }

    let report = Report {
        session: &session,
        extraction: &extraction,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize result")?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Result written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Loads the config file (if any), applies command-line overrides and
/// validates the result
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        (None, Some(url)) => Config {
            crawl: CrawlConfig::new(url.clone()),
            fetch: Default::default(),
            detectors: Default::default(),
        },
        (None, None) => bail!("either a CONFIG file or --url is required"),
    };

    if let Some(url) = &cli.url {
        config.crawl.seed_url = url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
    if cli.cross_origin {
        config.crawl.same_origin_only = false;
    }
    if cli.skip_stylesheets {
        config.crawl.include_stylesheets = false;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Sets up tracing based on verbosity flags
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("design_lens=info,warn"),
            1 => EnvFilter::new("design_lens=debug,info"),
            2 => EnvFilter::new("design_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
