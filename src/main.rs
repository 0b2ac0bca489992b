//! batch-review - resumable batch runner
//!
//! Runs a configured command once per work item with rate limiting, retries,
//! circuit breaking and checkpoints.

#![allow(missing_docs)]

use anyhow::{Context, Result};
use batch_review::config::Config;
use batch_review::core::item::load_items;
use batch_review::utils::logging::init_logging;
use batch_review::{BatchOrchestrator, CheckpointStore, CommandHandler, build_info};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit code when the batch finished with failed or cancelled items
const EXIT_INCOMPLETE: u8 = 2;

#[derive(Parser)]
#[command(name = "batch-review")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file path (YAML)
    #[arg(short, long, global = true, env = "BATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every item not yet checkpointed
    Run {
        /// Items file: a JSON array or JSON lines of {"id", "payload"}
        #[arg(short, long)]
        items: PathBuf,

        /// Write the batch result as JSON to this path
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },

    /// List checkpointed items
    Status,

    /// Delete all checkpoints
    Clear,

    /// Print build information
    Info,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Print error using Display (not Debug) to keep the context chain readable
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref()).await?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Run { items, summary } => run_batch(&config, &items, summary.as_deref()).await,
        Commands::Status => {
            let store = CheckpointStore::from_config(&config.checkpoint);
            if !store.is_enabled() {
                println!("Checkpoints are disabled");
                return Ok(ExitCode::SUCCESS);
            }
            let records = store.records().await?;
            println!(
                "{} completed item(s) in {}",
                records.len(),
                config.checkpoint.directory.display()
            );
            for record in records {
                println!("  ✓ {}", record.item_id);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Clear => {
            let store = CheckpointStore::from_config(&config.checkpoint);
            let removed = store.clear().await?;
            println!("Removed {} checkpoint(s)", removed);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info => {
            println!("{}", build_info());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// File first, then `BATCH_*` overrides; environment only when no file is given
async fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::from_file_with_env(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?;
            Ok(config)
        }
        None => Ok(Config::from_env()?),
    }
}

async fn run_batch(config: &Config, items: &Path, summary: Option<&Path>) -> Result<ExitCode> {
    let items = load_items(items).await?;
    let handler = CommandHandler::from_config(&config.handler)
        .context("set handler.command in the config file")?;

    let cancel = CancellationToken::new();
    let orchestrator =
        BatchOrchestrator::from_config(config)?.with_cancellation_token(cancel.clone());

    let signal = tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let result = orchestrator.run_batch(items, handler).await;
    signal.abort();
    let result = result?;

    println!("{}", result.render_summary());
    if let Some(path) = summary {
        result
            .write_summary(path)
            .await
            .with_context(|| format!("writing summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    if result.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, finishing in-flight items"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, finishing in-flight items");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
