//! Module for the "history" command.

use super::*;

/// Function for the [`Commands::History`] in the CLI.
pub async fn history<I: UserInteraction>(interaction: &I, config: &Config) -> Result<()> {
  let home = HomeView::load(&open_history(config).await?).await?;
  if home.is_empty() {
    return interaction.reply(ResponseContent::Info("No papers opened yet"));
  }
  interaction.reply(ResponseContent::Info("Continue where you left off:"))?;
  interaction.reply(ResponseContent::History(&home.entries))
}
