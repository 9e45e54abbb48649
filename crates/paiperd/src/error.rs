//! Error types for the `paiper` command line client.

use thiserror::Error;

use super::*;

/// Result alias used throughout the CLI.
pub type Result<T> = core::result::Result<T, PaiperdError>;

/// Errors the CLI can run into.
#[derive(Error, Debug)]
pub enum PaiperdError {
  /// Failure inside the client library
  #[error(transparent)]
  Paiper(#[from] PaiperError),

  /// A prompt could not be shown or answered
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// An invalid file pattern was given
  #[error(transparent)]
  Glob(#[from] glob::PatternError),

  /// A file system operation failed
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A paper page could not be opened
  #[error("Paper {0} not found")]
  PaperNotFound(i64),

  /// The backend could not answer a search
  #[error("Search for \"{query}\" failed: {message}")]
  SearchFailed {
    /// The query that failed
    query:   String,
    /// What went wrong
    message: String,
  },

  /// A file pattern matched nothing
  #[error("No files match {0}")]
  NoMatchingFiles(String),
}
