//! Blog-Harvester main entry point
//!
//! This is the command-line interface for the Blog-Harvester archiver.

use anyhow::{bail, Context};
use blog_harvester::config::{load_config_with_hash, validate, Config, LoggingConfig};
use blog_harvester::crawler::{run_harvest, Harvester};
use blog_harvester::output::{print_object_listing, print_query_results, print_summary};
use blog_harvester::records::{open_record_store, RecordAttribute, RecordStore};
use blog_harvester::storage::{open_object_store, MemoryObjectStore, ObjectStore};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

/// Blog-Harvester: a paginated blog archiver
///
/// Blog-Harvester walks the paginated listing of a blog, extracts the
/// metadata and body text of every post, and stores each body in an object
/// store under a key derived from its publish date and title.
#[derive(Parser, Debug)]
#[command(name = "blog-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A paginated blog archiver", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Listing page to start from (overrides harvest.seed-url)
    #[arg(long, value_name = "URL")]
    seed_url: Option<String>,

    /// Destination bucket (overrides storage.bucket)
    #[arg(long, value_name = "NAME")]
    bucket: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run the full pipeline into memory without persisting anything
    #[arg(long, conflicts_with_all = ["list", "query"])]
    dry_run: bool,

    /// List the objects stored in the bucket and exit
    #[arg(long, conflicts_with_all = ["dry_run", "query"])]
    list: bool,

    /// Query the record store (ATTR=VALUE) and exit
    #[arg(long, value_name = "ATTR=VALUE", conflicts_with_all = ["dry_run", "list"])]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    if cli.seed_url.is_some() || cli.bucket.is_some() {
        config.apply_overrides(cli.seed_url.clone(), cli.bucket.clone());
        validate(&config).context("Invalid command-line override")?;
    }

    let _guard = setup_logging(&config.logging, cli.verbose, cli.quiet)?;

    tracing::info!(
        path = %cli.config.display(),
        hash = %config_hash,
        "Configuration loaded successfully"
    );

    if cli.dry_run {
        handle_dry_run(&config).await
    } else if cli.list {
        handle_list(&config)
    } else if let Some(query) = &cli.query {
        handle_query(&config, query)
    } else {
        handle_harvest(&config).await
    }
}

/// Sets up the tracing subscriber from the `[logging]` section and flags
///
/// `RUST_LOG` takes precedence when set. The returned guard flushes the
/// file writer and must live until the program exits.
fn setup_logging(
    logging: &LoggingConfig,
    verbose: u8,
    quiet: bool,
) -> anyhow::Result<Option<WorkerGuard>> {
    let directive = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => format!("blog_harvester={},warn", logging.level),
            1 => "blog_harvester=debug,info".to_string(),
            2 => "blog_harvester=trace,debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let (file_layer, guard) = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Handles the --dry-run mode: full pipeline into an in-memory bucket
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed = Url::parse(&config.harvest.seed_url)?;
    let store = MemoryObjectStore::new(&config.storage.bucket);

    tracing::info!("Dry run: nothing will be persisted and no records written");
    let mut harvester = Harvester::from_config(config, store)?;
    let stats = harvester.run(&seed).await.context("Harvest failed")?;

    print_summary(&stats);
    println!(
        "Dry run: {} objects kept in memory, nothing persisted",
        harvester.store().len()
    );

    Ok(())
}

/// Handles the --list mode: lists the objects in the configured bucket
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let store = open_object_store(&config.storage)
        .with_context(|| format!("Failed to open bucket {}", config.storage.bucket))?;

    println!("Bucket: {}\n", store.bucket());
    let objects = store.list()?;
    print_object_listing(&objects);

    Ok(())
}

/// Handles the --query mode: exact-match lookup in the record store
fn handle_query(config: &Config, query: &str) -> anyhow::Result<()> {
    let Some(records) = &config.records else {
        bail!("--query requires a [records] section in the configuration");
    };

    let Some((name, value)) = query.split_once('=') else {
        bail!("Query must have the form ATTR=VALUE, got '{}'", query);
    };
    let Some(attribute) = RecordAttribute::from_name(name.trim()) else {
        bail!("Unknown query attribute '{}'", name.trim());
    };

    let store = open_record_store(Path::new(&records.database_path))
        .with_context(|| format!("Failed to open record store {}", records.database_path))?;

    let posts = store.query(attribute, value.trim())?;
    print_query_results(&posts);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        seed = %config.harvest.seed_url,
        bucket = %config.storage.bucket,
        records = config.records.is_some(),
        "Starting harvest"
    );

    match run_harvest(config).await {
        Ok(stats) => {
            print_summary(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
