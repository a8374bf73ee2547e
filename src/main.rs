//! udn-harvest main entry point
//!
//! This is the command-line interface for the udn.com news harvester.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use udn_harvest::config::{load_config_with_hash, Config};
use udn_harvest::crawler::run_crawl;
use udn_harvest::storage::{open_storage, ArticleStorage};
use udn_harvest::Article;

/// udn-harvest: a news article harvester for udn.com
///
/// Discovers article links on the configured index pages, extracts and
/// formats each article, and keeps the results in a SQLite database for
/// listing and searching.
#[derive(Parser, Debug)]
#[command(name = "udn-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A news article harvester for udn.com", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl until interrupted
    Crawl {
        /// Run a single crawl cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Validate config and show what would be crawled without crawling
    Check,

    /// List stored articles, newest first
    List,

    /// Print one stored article
    Get {
        /// Article id
        id: String,
    },

    /// Find stored articles matching any keyword
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },

    /// Show recent crawl cycles
    Runs {
        /// Number of cycles to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl { once } => handle_crawl(config, config_hash, once).await?,
        Command::Check => handle_check(&config),
        Command::List => handle_list(&config)?,
        Command::Get { id } => handle_get(&config, &id)?,
        Command::Search { keywords } => handle_search(&config, &keywords)?,
        Command::Runs { limit } => handle_runs(&config, limit)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("udn_harvest=info,warn"),
            1 => EnvFilter::new("udn_harvest=debug,info"),
            2 => EnvFilter::new("udn_harvest=trace,debug"),
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

/// Handles `check`: validates config and shows what would be crawled
fn handle_check(config: &Config) {
    println!("=== udn-harvest Check ===\n");

    println!("Site:");
    println!("  Title: {}", config.site.title);
    println!("  Domain: {}", config.site.domain);
    println!("  Timeout: {:?}", config.site.timeout());

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Max index pages: {}", config.crawler.max_index_pages);
    println!("  Freshness: {} days", config.crawler.freshness_days);
    println!(
        "  Interval: {}",
        humantime::format_duration(config.crawler.interval())
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nTranslate:");
    println!("  Target: {}", config.translate.target);

    println!("\nIndex URLs ({}):", config.discovery.index_urls.len());
    for index in &config.discovery.index_urls {
        println!("  - {}", index);
    }
    println!("  Article pattern: {}", config.discovery.article_pattern);

    println!("\nFilters:");
    println!(
        "  Ignored categories: {}",
        config.filters.ignore_categories.len()
    );
    println!("  Title suffixes: {}", config.filters.title_suffixes.len());
    println!(
        "  Ignored domains: {}",
        config.filters.ignore_domains.join(", ")
    );

    println!("\n✓ Configuration is valid");
}

fn print_summary(article: &Article) {
    println!(
        "{}  {}  {}",
        article.id,
        article
            .update_time
            .with_timezone(&udn_harvest::article::shanghai())
            .format("%Y-%m-%d %H:%M"),
        article.title
    );
}

/// Handles `list`: prints every stored article
fn handle_list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let articles = storage.list()?;

    for article in &articles {
        print_summary(article);
    }
    println!("\n{} articles", articles.len());

    Ok(())
}

/// Handles `get`: prints one article's content
fn handle_get(config: &Config, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let article = storage.get(id)?;
    println!("{}", article.content);
    Ok(())
}

/// Handles `search`: prints articles matching any keyword
fn handle_search(config: &Config, keywords: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let articles = storage.search(keywords)?;

    for article in &articles {
        print_summary(article);
    }
    println!("\n{} matching articles", articles.len());

    Ok(())
}

/// Handles `runs`: shows recent crawl cycles
fn handle_runs(config: &Config, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(Path::new(&config.output.database_path))?;

    for run in storage.recent_runs(limit)? {
        println!(
            "#{} {} [{}] {}",
            run.id,
            run.started_at,
            run.status.to_db_string(),
            run.stats
        );
    }

    Ok(())
}

/// Handles `crawl`: runs cycles until Ctrl-C, or once
async fn handle_crawl(
    config: Config,
    config_hash: String,
    once: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Index URLs: {}, workers: {}",
        config.discovery.index_urls.len(),
        config.crawler.workers
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing up");
            on_signal.cancel();
        }
    });

    match run_crawl(config, config_hash, cancel, once).await {
        Ok(stats) => {
            tracing::info!("Crawl finished: {}", stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
