//! Webharvest command-line interface
//!
//! Scrapes one or more URLs with a schema file and prints or exports the
//! extracted records.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webharvest::config::{apply_env_overrides, load_config_with_hash, save_config};
use webharvest::runner::{Job, UrlOutcome};
use webharvest::schema::load_schema;
use webharvest::{Scraper, ScraperConfig};

/// Webharvest: schema-driven web scraping
///
/// Fetches the given URLs politely, extracts the fields described by the
/// schema file, and writes the records to the output path (format chosen by
/// extension) or to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "webharvest")]
#[command(version)]
#[command(about = "Schema-driven web scraping", long_about = None)]
struct Cli {
    /// URLs to scrape
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to the schema file (JSON or TOML)
    #[arg(short, long, value_name = "SCHEMA")]
    schema: PathBuf,

    /// Path to a configuration file (JSON or TOML); defaults apply otherwise
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output path; format by extension (json, csv, xlsx, db)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Re-run the job every N seconds until interrupted
    #[arg(long, value_name = "SECONDS")]
    every: Option<u64>,

    /// Write the effective configuration to a file and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["output", "every"])]
    dump_config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            let mut config = ScraperConfig::default();
            apply_env_overrides(&mut config).context("invalid environment override")?;
            config
        }
    };

    if let Some(path) = &cli.dump_config {
        save_config(&config, path)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let schema = load_schema(&cli.schema)
        .with_context(|| format!("failed to load schema {}", cli.schema.display()))?;

    let scraper = Scraper::new(config).context("failed to initialize scraper")?;

    let mut job = match cli.every {
        Some(seconds) => Job::recurring(cli.urls.clone(), schema, Duration::from_secs(seconds)),
        None => Job::once(cli.urls.clone(), schema),
    };
    if let Some(output) = &cli.output {
        job = job.with_output(output.clone());
    }

    let runner = scraper.runner();
    let reports = runner.run(&job).await;

    // Report the final cycle
    let report = reports.last().expect("runner yields at least one report");
    for result in &report.results {
        match &result.outcome {
            UrlOutcome::Extracted(_) => tracing::info!("ok       {}", result.url),
            UrlOutcome::Denied => tracing::warn!("denied   {}", result.url),
            UrlOutcome::Cancelled => tracing::warn!("skipped  {}", result.url),
            UrlOutcome::Failed(cause) => tracing::error!("failed   {}: {}", result.url, cause),
        }
    }

    if cli.output.is_none() {
        println!("{}", serde_json::to_string_pretty(&report.records())?);
    }

    if let Some(e) = &report.export_error {
        anyhow::bail!("export failed: {}", e);
    }

    tracing::info!("Job status: {:?}", report.status);
    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webharvest=info,warn"),
            1 => EnvFilter::new("webharvest=debug,info"),
            2 => EnvFilter::new("webharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
