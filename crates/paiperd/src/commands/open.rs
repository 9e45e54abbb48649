//! Module for the "open" command.

use super::*;

/// Options of [`Commands::Open`].
#[derive(Args, Clone)]
pub struct OpenOptions {
  /// Backend identifier of the paper. Pick from the history when omitted.
  pub id: Option<i64>,
}

/// Function for the [`Commands::Open`] in the CLI.
///
/// Opening records the paper in the history, then waits for the AI crew and the
/// photo listing.
pub async fn open<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  options: OpenOptions,
) -> Result<()> {
  let history = open_history(config).await?;
  let id = match options.id {
    Some(id) => id,
    None => {
      let home = HomeView::load(&history).await?;
      if home.is_empty() {
        return interaction.reply(ResponseContent::Info(
          "No papers opened yet. Use `paiper search` to find one.",
        ));
      }
      let items: Vec<String> = home.entries.iter().map(ToString::to_string).collect();
      match interaction.select("Continue reading", &items)? {
        Some(index) => home.entries[index].id,
        None => return interaction.reply(ResponseContent::Info("Operation cancelled")),
      }
    },
  };

  let backend = connect(config)?;
  let mut session = match PaperSession::open(backend, &history, id).await {
    Ok(session) => session,
    Err(PaiperError::Status { status: 404, .. }) => return Err(PaiperdError::PaperNotFound(id)),
    Err(e) => return Err(e.into()),
  };
  interaction.reply(ResponseContent::Paper(&session.view().paper))?;
  interaction.reply(ResponseContent::Working("Asking the AI crew..."))?;

  let view = session.settle().await;
  interaction.reply(ResponseContent::PaperPage(view))
}
