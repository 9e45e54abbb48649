//! Module for the "clean" command.

use super::*;

/// Function for the [`Commands::Clean`] in the CLI.
///
/// Deletes the storage file together with its SQLite sidecar files.
pub fn clean<I: UserInteraction>(interaction: &I, config: &Config) -> Result<()> {
  let path = &config.database_path;
  if !path.exists() {
    return interaction
      .reply(ResponseContent::Warning(&format!("No storage found at: {}", path.display())));
  }

  interaction.reply(ResponseContent::Warning(&format!("Storage found at: {}", path.display())))?;
  if !interaction.confirm("Delete the paper history and all cached data?")? {
    return interaction.reply(ResponseContent::Info("Operation cancelled"));
  }

  std::fs::remove_file(path)?;
  for sidecar in glob::glob(&format!("{}-*", glob::Pattern::escape(&path.display().to_string())))?
    .flatten()
  {
    trace!("Removing {}", sidecar.display());
    std::fs::remove_file(sidecar)?;
  }
  interaction.reply(ResponseContent::Success("Local storage cleaned"))
}
