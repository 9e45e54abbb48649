//! Module for the "search" command.

use super::*;

/// Options of [`Commands::Search`].
#[derive(Args, Clone)]
pub struct SearchOptions {
  /// Search query
  pub query: String,
}

/// Function for the [`Commands::Search`] in the CLI.
///
/// The query goes through the same debounced controller an interactive search
/// box uses. An empty query never reaches the backend.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  options: SearchOptions,
) -> Result<()> {
  if options.query.trim().is_empty() {
    return interaction.reply(ResponseContent::Info(&SearchState::Idle.to_string()));
  }

  let backend = connect(config)?;
  let mut controller = SearchController::spawn(backend, config.search_debounce());
  controller.input(options.query.as_str());

  interaction.reply(ResponseContent::Working(&format!("Searching for: {}", options.query.trim())))?;
  match controller.settled().await {
    SearchState::Results { results, .. } => {
      interaction.reply(ResponseContent::Results(&results))?;
      if results.iter().any(|result| result.id.is_some()) {
        interaction.reply(ResponseContent::Info("Open a paper with `paiper open <id>`"))?;
      }
      Ok(())
    },
    SearchState::NotFound { query } =>
      interaction.reply(ResponseContent::Info(&format!("No papers found for \"{query}\""))),
    SearchState::Error { query, message } => Err(PaiperdError::SearchFailed { query, message }),
    state => interaction.reply(ResponseContent::Info(&state.to_string())),
  }
}
