//! Error types for the paiper library.
//!
//! Every failure the client can run into funnels into [`PaiperError`]:
//! - Network and HTTP status failures talking to the backend
//! - Malformed or error-shaped response bodies
//! - Local storage failures
//! - Configuration problems
//!
//! # Examples
//!
//! ```no_run
//! use paiper::{backend::Backend, error::PaiperError, prelude::*};
//!
//! # async fn example() -> Result<(), PaiperError> {
//! let backend = Backend::from_env()?;
//! match backend.fetch_paper(42).await {
//!   Err(PaiperError::Status { status, .. }) => println!("backend answered {status}"),
//!   Err(PaiperError::Parse(e)) => println!("unreadable paper: {e}"),
//!   Err(e) => println!("other error: {e}"),
//!   Ok(paper) => println!("{}", paper.title),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`paiper`](crate) crate.
pub type Result<T> = core::result::Result<T, PaiperError>;

/// Errors that can occur when working with the paiper library.
#[derive(Error, Debug)]
pub enum PaiperError {
  /// A request could not be sent or its body could not be read.
  ///
  /// This covers DNS failures, refused connections, TLS errors and aborted
  /// transfers.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The backend answered with a non-success HTTP status.
  ///
  /// The body is kept as text since error responses are not guaranteed to be JSON.
  #[error("Backend returned {status}: {body}")]
  Status {
    /// HTTP status code of the response
    status: u16,
    /// Raw response body
    body:   String,
  },

  /// A response body was not the JSON we expected.
  #[error(transparent)]
  Parse(#[from] serde_json::Error),

  /// The backend reported its own failure inside a successful response.
  ///
  /// The pAIper backend catches exceptions and answers `{"error": "..."}` with a
  /// 200 status; the message is carried here.
  #[error("Backend error: {0}")]
  Backend(String),

  /// A storage key has no value and no sync producer to fall back on.
  #[error("No data found for key \"{0}\"")]
  NotFound(String),

  /// Access to a local resource (for example an image file) was refused.
  #[error("Permission denied: {0}")]
  PermissionDenied(String),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be written.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// A URL could not be parsed or joined.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// The configuration is missing something required.
  #[error("{0}")]
  Config(String),
}
