//! Module for the "photos" commands.

use paiper::session::{photo_file_name, read_photo};

use super::*;

/// Photo note operations.
#[derive(Subcommand, Clone)]
pub enum PhotoCommands {
  /// List the photo notes of a paper
  List {
    /// Backend identifier of the paper
    id: i64,
  },

  /// Upload images as photo notes. Only the last upload is shown on the paper page.
  Upload {
    /// Backend identifier of the paper
    id: i64,

    /// Image files or glob patterns, e.g. "notes/*.jpg"
    #[arg(required = true)]
    files: Vec<String>,
  },

  /// Delete the photo note shown on the paper page
  Delete {
    /// Backend identifier of the paper
    id: i64,
  },
}

/// Function for the [`Commands::Photos`] in the CLI.
pub async fn photos<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  cmd: PhotoCommands,
) -> Result<()> {
  let backend = connect(config)?;
  match cmd {
    PhotoCommands::List { id } => {
      let photos = backend
        .list_photos(id)
        .await?
        .iter()
        .map(|photo| backend.resolve_photo_url(photo))
        .collect::<paiper::error::Result<Vec<_>>>()?;
      if photos.is_empty() {
        return interaction.reply(ResponseContent::Info(&format!("No photo notes for paper {id}")));
      }
      interaction.reply(ResponseContent::Photos(&photos))
    },
    PhotoCommands::Upload { id, files } => {
      for file in expand(&files)? {
        let image = match read_photo(&file).await {
          Ok(image) => image,
          Err(e @ PaiperError::PermissionDenied(_)) => {
            interaction.reply(ResponseContent::Warning(&e.to_string()))?;
            continue;
          },
          Err(e) => return Err(e.into()),
        };
        let url = backend.upload_photo(id, image, &photo_file_name()).await?;
        interaction
          .reply(ResponseContent::Success(&format!("Uploaded {} as {url}", file.display())))?;
      }
      Ok(())
    },
    PhotoCommands::Delete { id } => {
      let photos = backend.list_photos(id).await?;
      let Some(photo) = photos.last().filter(|photo| !photo.is_empty()) else {
        return interaction.reply(ResponseContent::Info(&format!("No photo notes for paper {id}")));
      };
      if !interaction.confirm(&format!("Delete photo note {photo}?"))? {
        return interaction.reply(ResponseContent::Info("Operation cancelled"));
      }
      backend.delete_photo(id, photo).await?;
      interaction.reply(ResponseContent::Success("Photo note deleted"))
    },
  }
}

/// Expands glob patterns into files, in the order given.
fn expand(patterns: &[String]) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for pattern in patterns {
    let matches: Vec<PathBuf> =
      glob::glob(pattern)?.flatten().filter(|path| path.is_file()).collect();
    if matches.is_empty() {
      return Err(PaiperdError::NoMatchingFiles(pattern.clone()));
    }
    files.extend(matches);
  }
  Ok(files)
}
