use std::sync::Arc;

use super::*;

pub mod clean;
pub mod config;
pub mod history;
pub mod open;
pub mod photos;
pub mod search;

pub use clean::clean;
pub use config::{configure, ConfigOptions};
pub use history::history;
pub use open::{open, OpenOptions};
pub use photos::{photos, PhotoCommands};
pub use search::{search, SearchOptions};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Search the backend for papers
  Search(SearchOptions),

  /// Open a paper with its AI summary, takeaway and citation
  Open(OpenOptions),

  /// List previously opened papers
  History,

  /// Manage photo notes attached to a paper
  Photos {
    /// The photo operation to run
    #[command(subcommand)]
    cmd: PhotoCommands,
  },

  /// Removes the local storage after confirmation
  Clean,

  /// Show or change the configuration
  Config(ConfigOptions),
}

/// Connects to the configured backend.
fn connect(config: &Config) -> Result<Arc<Backend>> { Ok(Arc::new(Backend::from_config(config)?)) }

/// Opens the history in the configured storage file.
async fn open_history(config: &Config) -> Result<HistoryStore> {
  Ok(HistoryStore::open(&config.database_path).await?)
}
