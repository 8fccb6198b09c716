//! perfscan - two-phase web performance audit worker
//!
//! Runs one task per invocation. The collect stage runs a PageSpeed audit
//! for every category and device strategy and stores each raw result; the
//! process stage merges those results into one report per strategy and
//! derives a compact summary. The task result is sent downstream before
//! the process exits.
//!
//! Exit codes:
//!   0 - Task completed and its result was reported
//!   1 - Configuration error, task failure, or reporting failure

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod provider;
mod report;
mod reporter;
mod storage;
mod worker;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, StorageBackend, CONFIG_FILE};
use provider::{PageSpeedClient, PageSpeedConfig};
use reporter::{ConsoleReporter, HttpReporter, Reporter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use storage::{ArtifactStore, FsStore, HttpStore, MemoryStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use worker::{TaskOutcome, Worker};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration is needed before logging so the file can raise verbosity
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("perfscan v{}", env!("CARGO_PKG_VERSION"));
    debug!("Operation: {:?}, task file: {:?}", args.operation, args.task);

    match run_task(&args, &config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Task failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .perfscan.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the API key, storage backend, and callback URL.");
    Ok(())
}

/// Pick the log level from the flags, falling back to the config file.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    Ok(Config::load_default()?.unwrap_or_default())
}

/// Build every collaborator a task needs.
///
/// Nothing here talks to the network; a bad URL or missing setting fails
/// the run before any task is accepted.
fn build_worker(config: &Config) -> Result<Worker> {
    let provider = PageSpeedClient::new(PageSpeedConfig {
        api_url: config.provider.api_url.clone(),
        api_key: config.provider.api_key.clone(),
        timeout_seconds: config.provider.timeout_seconds,
    })?;

    let store: Arc<dyn ArtifactStore> = match config.storage.backend {
        StorageBackend::Fs => {
            info!("Storing artifacts under {}", config.storage.root);
            Arc::new(FsStore::new(&config.storage.root))
        }
        StorageBackend::Http => {
            let base_url = config
                .storage
                .base_url
                .as_deref()
                .context("storage.base_url is required for the http backend")?;
            info!("Storing artifacts at {}", base_url);
            Arc::new(HttpStore::new(base_url, config.storage.timeout_seconds)?)
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store; artifacts are discarded on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let reporter: Arc<dyn Reporter> = match config.reporter.callback_url {
        Some(ref callback_url) => Arc::new(HttpReporter::new(
            callback_url,
            config.reporter.timeout_seconds,
        )?),
        None => Arc::new(ConsoleReporter),
    };

    Ok(Worker::new(Arc::new(provider), store, reporter))
}

/// Initialize the worker, then accept and run the task.
async fn run_task(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    let worker = build_worker(config)?;
    let task = args.build_task()?;
    let slug = task.slug.clone();

    let outcome = worker.handle(task).await?;

    match outcome {
        TaskOutcome::Collected(keys) => {
            info!("Collected {} audits for {}", keys.len(), slug);
            if args.output.is_some() {
                warn!("--output only applies to process tasks; nothing written");
            }
        }
        TaskOutcome::Processed(results) => {
            info!("Processed {} strategies for {}", results.len(), slug);
            if let Some(ref path) = args.output {
                report::write_report(&slug, &results, args.format, path)?;
                info!("Summary written to {}", path.display());
            }
        }
    }

    info!("Done in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
