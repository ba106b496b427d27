//! Story-Archiver main entry point
//!
//! This is the command-line interface for the Story-Archiver front-page archiver.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use story_archiver::config::{load_config_with_hash, Config, ConfigOverrides};
use story_archiver::crawler::crawl;
use story_archiver::output::print_report;
use tracing_subscriber::EnvFilter;

/// Story-Archiver: archive the stories on a news front page
///
/// Fetches the front page, and for every unique story saves the linked page
/// and every outbound link cited in its discussion thread into a directory
/// named after the story.
#[derive(Parser, Debug)]
#[command(name = "story-archiver")]
#[command(version)]
#[command(about = "Archive the stories on a news front page", long_about = None)]
struct Cli {
    /// Output directory receiving one sub-directory per story
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Listing period label (recorded, does not change what is fetched)
    #[arg(long)]
    period: String,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not write a `readme` manifest into each story directory
    #[arg(long)]
    no_manifest: bool,

    /// Print a report of the run to stdout when it finishes
    #[arg(long)]
    report: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let report = match crawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if cli.report {
        print_report(&report);
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("No story was archived");
        Ok(ExitCode::FAILURE)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("story_archiver=info,warn"),
            1 => EnvFilter::new("story_archiver=debug,info"),
            2 => EnvFilter::new("story_archiver=trace,debug"),
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

/// Loads the configuration file (if any) and applies command-line overrides
fn load(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let overrides = ConfigOverrides {
        output_directory: Some(cli.out.display().to_string()),
        period: Some(cli.period.clone()),
        no_manifest: cli.no_manifest,
    };

    Ok(overrides.apply(config)?)
}
