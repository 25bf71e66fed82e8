//! Manual Indexer main entry point
//!
//! This is the command-line interface for indexing one documentation manual.

use clap::Parser;
use manual_indexer::config::{load_config_with_hash, Config};
use manual_indexer::output::{format_documents, print_summary};
use manual_indexer::{ElasticsearchClient, ManualIndexer, MemorySearchClient, SearchClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Manual Indexer: section-level search indexing for documentation manuals
///
/// Reads the manual's sitemap page, extracts every linked section and
/// writes one search document per section. Documents of sections that
/// disappeared from the manual are retracted afterwards.
#[derive(Parser, Debug)]
#[command(name = "manual-indexer")]
#[command(version)]
#[command(about = "Indexes the sections of a rendered documentation manual", long_about = None)]
struct Cli {
    /// Base URL of the rendered manual
    #[arg(value_name = "MANUAL_URL")]
    manual_url: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Index into memory and print the documents instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Keep documents of sections that are no longer in the sitemap
    #[arg(long)]
    no_retract: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli).await
    } else {
        handle_index(&config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("manual_indexer=info,warn"),
            1 => EnvFilter::new("manual_indexer=debug,info"),
            2 => EnvFilter::new("manual_indexer=trace,debug"),
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

/// Handles the --dry-run mode: indexes into memory and prints the documents
async fn handle_dry_run(config: &Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let memory = Arc::new(MemorySearchClient::new());
    let search: Arc<dyn SearchClient> = memory.clone();

    println!("=== Manual Indexer Dry Run ===\n");
    println!("Index: {} (not written)", config.search.index);
    println!("Manual: {}\n", cli.manual_url);

    run(config, cli, search).await?;

    println!();
    print!("{}", format_documents(&memory.documents(&config.search.index)));

    Ok(())
}

/// Handles the main indexing operation against the configured search engine
async fn handle_index(config: &Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Search engine: {} (index {})",
        config.search.endpoint,
        config.search.index
    );

    let search: Arc<dyn SearchClient> = Arc::new(ElasticsearchClient::from_config(&config.search)?);
    run(config, cli, search).await
}

async fn run(
    config: &Config,
    cli: &Cli,
    search: Arc<dyn SearchClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let indexer = ManualIndexer::from_config(config, search)?;

    let outcome = if cli.no_retract {
        indexer.index_manual(&cli.manual_url).await
    } else {
        indexer.reindex_manual(&cli.manual_url).await
    };

    match outcome {
        Ok(result) => {
            print_summary(&result);
            if !result.is_complete() {
                tracing::warn!("{} sections could not be indexed", result.failed());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Indexing failed: {}", e);
            Err(e.into())
        }
    }
}
