//! Module for the "config" command.

use std::time::Duration;

use super::*;

/// Options of [`Commands::Config`]. Without any option the current
/// configuration is printed.
#[derive(Args, Clone)]
pub struct ConfigOptions {
  /// Base URL of the pAIper backend
  #[arg(long)]
  pub backend_url: Option<Url>,

  /// Debounce window for search input, in milliseconds
  #[arg(long)]
  pub debounce_ms: Option<u64>,

  /// Directory for rolling log files
  #[arg(long)]
  pub log_dir: Option<PathBuf>,
}

/// Function for the [`Commands::Config`] in the CLI.
pub fn configure<I: UserInteraction>(
  interaction: &I,
  mut config: Config,
  path: &Path,
  options: ConfigOptions,
) -> Result<()> {
  let ConfigOptions { backend_url, debounce_ms, log_dir } = options;
  let changed = backend_url.is_some() || debounce_ms.is_some() || log_dir.is_some();

  if let Some(url) = backend_url {
    config = config.with_backend_url(url);
  }
  if let Some(ms) = debounce_ms {
    config = config.with_search_debounce(Duration::from_millis(ms));
  }
  if let Some(dir) = log_dir {
    config = config.with_log_dir(&dir);
  }
  if changed {
    config.save_to(path)?;
    interaction.reply(ResponseContent::Success(&format!("Saved configuration to {}", path.display())))?;
  }

  let backend = match config.backend_url() {
    Ok(url) => url.to_string(),
    Err(_) => "(not set)".to_string(),
  };
  interaction.reply(ResponseContent::Info(&format!("Configuration file: {}", path.display())))?;
  interaction.reply(ResponseContent::Info(&format!("Backend: {backend}")))?;
  interaction
    .reply(ResponseContent::Info(&format!("Storage: {}", config.database_path.display())))?;
  interaction.reply(ResponseContent::Info(&format!(
    "Search debounce: {} ms",
    config.search_debounce().as_millis()
  )))?;
  let logs = config.log_dir.as_ref().map_or("stderr".to_string(), |dir| dir.display().to_string());
  interaction.reply(ResponseContent::Info(&format!("Logs: {logs}")))
}
