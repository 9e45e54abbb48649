//! Command line client for the pAIper research reading assistant.
//!
//! This crate provides the `paiper` binary on top of the [`paiper`] library. It
//! supports:
//! - Debounced paper search against the backend
//! - Opening a paper with its AI summary, takeaway and citation
//! - The "continue where you left off" history
//! - Uploading, listing and deleting photo notes
//! - Local storage cleanup and configuration
//!
//! # Usage
//!
//! ```bash
//! # Point the client at a backend (or put this in a .env file)
//! export PAIPER_BACKEND_URL=http://localhost:8000
//!
//! # Search for papers
//! paiper search "graph neural networks"
//!
//! # Open a paper, or pick one from the history when no id is given
//! paiper open 42
//! paiper open
//!
//! # Attach a photo note and remove it again
//! paiper photos upload 42 ~/notes/*.jpg
//! paiper photos delete 42
//! ```
//!
//! Destructive operations ask for confirmation unless `--accept-defaults` is
//! given. Use `-v` (repeatable) for more log output.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use paiper::{
  backend::Backend,
  config::Config,
  error::PaiperError,
  history::HistoryStore,
  paper::{HistoryEntry, ResearchPaper, SearchResult},
  prelude::*,
  search::{SearchController, SearchState},
  session::{AiStatus, HomeView, PaperSession, PaperView},
};
use tracing::{debug, trace};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use url::Url;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Command line client for the pAIper reading assistant")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the local storage file. If not specified, uses the configured path or the
  /// platform-specific data directory.
  #[arg(long, short, global = true)]
  path: Option<PathBuf>,

  /// Path to the configuration file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// The configuration file in use.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }
}

/// Configures the logging system based on the verbosity level
///
/// Logs go to stderr, or to a daily rolling file in `log_dir` when one is
/// configured. `RUST_LOG` overrides the verbosity flag.
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  match log_dir {
    Some(dir) => {
      let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "paiper.log"));
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(writer)
        .init();
      Some(guard)
    },
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
      None
    },
  }
}

/// Entry point for the `paiper` CLI application
///
/// Loads `.env` and the configuration file, sets up logging, and executes the
/// requested command.
///
/// # Errors
///
/// Returns a [`PaiperdError`] for backend, storage, file system and user
/// interaction failures.
#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();

  let config_path = cli.config_path();
  let stored = Config::load_from(&config_path)?;
  let guard = setup_logging(cli.verbose, stored.log_dir.as_deref());
  debug!("Using configuration from {}", config_path.display());

  // `--path` applies to this run only and is never written back
  let config = match &cli.path {
    Some(path) => stored.clone().with_database_path(path),
    None => stored.clone(),
  };

  let result = match cli.command.clone() {
    Commands::Search(options) => search(&cli, &config, options).await,
    Commands::Open(options) => open(&cli, &config, options).await,
    Commands::History => history(&cli, &config).await,
    Commands::Photos { cmd } => photos(&cli, &config, cmd).await,
    Commands::Clean => clean(&cli, &config),
    Commands::Config(options) => configure(&cli, stored, &config_path, options),
  };

  // Reported once here; returning the error would print it again
  if let Err(e) = result {
    cli.reply(ResponseContent::Error(&e))?;
    drop(guard);
    std::process::exit(1);
  }
  Ok(())
}
