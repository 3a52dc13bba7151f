mod input;
mod inspect;
mod store;
mod sync;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use profsync_core::{InsertionPolicy, SheetLayout, UpdateMode};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "profsync")]
#[command(about = "Keep the profile spreadsheet in sync with observed profile records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile observed records (JSON Lines) into the profile sheet.
    Sync(SyncArgs),
    /// Print the tag string of every tagged identifier.
    Tags,
    /// List the pending entries of the target sheet.
    Targets,
    /// Show both normalized forms of a relative time phrase.
    Normalize {
        /// Phrase such as "3 hours ago".
        phrase: String,
    },
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// JSON Lines file of observed records, keyed by sheet header.
    #[arg(long)]
    input: PathBuf,

    /// Resolve relative JOINED and LDATE-TIME phrases against the current time.
    #[arg(long)]
    relative_times: bool,

    /// Only sync identifiers pending in the target sheet, then update their status.
    #[arg(long)]
    targets: bool,

    /// Profile sheet layout (`a` or `b`); overrides `PROFSYNC_LAYOUT`.
    #[arg(long)]
    layout: Option<SheetLayout>,

    /// Where new rows go (`top` or `append`); overrides `PROFSYNC_INSERTION`.
    #[arg(long)]
    insertion: Option<InsertionPolicy>,

    /// How changed rows are written (`row` or `cells`); overrides `PROFSYNC_UPDATE_MODE`.
    #[arg(long)]
    update_mode: Option<UpdateMode>,

    /// Records per flush; overrides `PROFSYNC_BATCH_SIZE`.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = profsync_core::load_app_config().context("failed to load configuration")?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Sync(args) => sync::run_sync(config, &args),
        Commands::Tags => inspect::run_tags(&config),
        Commands::Targets => inspect::run_targets(&config),
        Commands::Normalize { phrase } => {
            inspect::run_normalize(&phrase);
            Ok(())
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the configured level applies.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
