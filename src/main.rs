//! Ad-Harvest main entry point
//!
//! This is the command-line interface for the ad catalog harvester.

use ad_harvest::config::{load_config_with_hash, Config};
use ad_harvest::crawler::{harvest, run_insights, RetryPolicy};
use ad_harvest::linker::run_linking;
use ad_harvest::output::{load_statistics, print_harvest_summary, print_statistics};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Ad-Harvest: a resumable ad catalog harvester
///
/// Ad-Harvest walks an ad account's live campaigns, ad sets and ads,
/// resolves each ad's creative into a destination URL, and checkpoints
/// after every campaign so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "ad-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable ad catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh harvest, discarding previous results and cursor
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with_all = ["link", "insights", "stats"])]
    dry_run: bool,

    /// Classify harvested ads and link them to book metadata
    #[arg(long, conflicts_with_all = ["dry_run", "insights", "stats", "fresh"])]
    link: bool,

    /// Skip unclassified ads instead of prompting (with --link)
    #[arg(long, requires = "link")]
    non_interactive: bool,

    /// Fetch raw per-ad delivery metrics for harvested ads
    #[arg(long, conflicts_with_all = ["dry_run", "link", "stats", "fresh"])]
    insights: bool,

    /// Show statistics from the persisted documents and exit
    #[arg(long, conflicts_with_all = ["dry_run", "link", "insights", "fresh"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.link {
        handle_link(&config, !cli.non_interactive).await?;
    } else if cli.insights {
        handle_insights(&config).await?;
    } else {
        handle_harvest(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ad_harvest=info,warn"),
            1 => EnvFilter::new("ad_harvest=debug,info"),
            2 => EnvFilter::new("ad_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Ad-Harvest Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Account: {}", config.api.account_path());
    println!("  Page limit: {}", config.api.page_limit);
    println!("  Timeout: {}s", config.api.timeout_secs);
    let token = if config.api.access_token.is_some() {
        "present"
    } else {
        "MISSING"
    };
    println!(
        "  Access token: {} (env {})",
        token, config.api.access_token_env
    );

    let policy = RetryPolicy::from_config(&config.retry);
    println!("\nRetry:");
    println!("  Max attempts: {}", policy.max_attempts());
    println!("  Rate-limit marker: {:?}", config.retry.rate_limit_marker);
    let schedule: Vec<String> = policy
        .schedule()
        .map(|d| format!("{}ms", d.as_millis()))
        .collect();
    println!("  Backoff schedule: [{}]", schedule.join(", "));

    println!("\nCrawler:");
    println!("  Live status: {}", config.crawler.live_status);
    println!("  Ad set delay: {}ms", config.crawler.adset_delay_ms);
    println!("  Resolve creatives: {}", config.crawler.resolve_creatives);

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Cursor: {}", config.output.cursor_path);
    println!("  Linked: {}", config.output.linked_path);
    println!("  Insights: {}", config.output.insights_path);

    println!("\nLinker:");
    println!(
        "  Lead-gen markers: {}",
        config.linker.lead_gen_markers.join(", ")
    );
    println!(
        "  Marketplace domains: {}",
        config.linker.marketplace_domains.join(", ")
    );
    if config.linker.lookup_url.is_empty() {
        println!("  Lookup: disabled");
    } else {
        println!("  Lookup: {}", config.linker.lookup_url);
    }

    println!("\nCatalog ({}):", config.catalog.len());
    for entry in &config.catalog {
        println!("  - {} {}", entry.asin, entry.title);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would harvest live campaigns of {}",
        config.api.account_path()
    );
}

/// Handles the --stats mode: shows statistics from the persisted documents
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Results: {}", config.output.results_path);
    println!("Linked: {}\n", config.output.linked_path);

    let stats = load_statistics(&config.output)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --link mode: classification and linking pass
async fn handle_link(config: &Config, interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    match run_linking(config, interactive).await {
        Ok(report) => {
            println!(
                "✓ Linked {} new ads ({} already linked, {} skipped)",
                report.linked, report.already_linked, report.skipped
            );
            println!("✓ Output: {}", config.output.linked_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Linking failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --insights mode: raw metrics for harvested ads
async fn handle_insights(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match run_insights(config).await {
        Ok(count) => {
            println!(
                "✓ Saved insights for {} ads to {}",
                count, config.output.insights_path
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Insights fetch failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        tracing::info!("Starting fresh harvest (ignoring previous results)");
    } else {
        tracing::info!("Starting harvest (will resume from the saved cursor)");
    }

    tracing::info!(
        "Account: {}, live status: {}",
        config.api.account_path(),
        config.crawler.live_status
    );

    match harvest(config, fresh).await {
        Ok(summary) => {
            tracing::info!("Harvest completed successfully");
            print_harvest_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
