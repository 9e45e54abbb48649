//! Client library for the pAIper research reading assistant.
//!
//! `paiper` talks to the pAIper backend and keeps the small amount of local state the
//! reading workflow needs:
//!
//! - Paper search with debounced input
//! - Full paper retrieval by identifier
//! - AI-generated summary, takeaway and citation text ("crew runs")
//! - Photo notes attached to a paper
//! - A persisted history of previously opened papers
//!
//! # Getting Started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use paiper::{backend::Backend, history::HistoryStore, session::PaperSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let backend = Arc::new(Backend::from_env()?);
//!   let history = HistoryStore::open(HistoryStore::default_path()).await?;
//!
//!   // Opening a paper records it in history and starts the AI and photo requests
//!   let mut session = PaperSession::open(backend, &history, 42).await?;
//!   while session.next().await.is_some() {}
//!   println!("Summary: {}", session.view().insights.summary);
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Paper, author and search result types
//! - [`storage`]: Persisted key-value storage with expiry and sync fallbacks
//! - [`history`]: The "continue where you left off" history store
//! - [`backend`]: REST client for the pAIper backend
//! - [`search`]: Debounced search state machine
//! - [`session`]: Paper page and home view models
//! - [`config`]: User configuration
//! - [`error`]: Error types

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::HashMap,
  fmt::Display,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, trace, warn};
use url::Url;
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod backend;
pub mod config;
pub mod error;
pub mod history;
pub mod paper;
pub mod search;
pub mod session;
pub mod storage;

use crate::{error::*, paper::*};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use paiper::prelude::*;
///
/// async fn example(api: &dyn PaperApi) -> Result<(), PaiperError> {
///   let paper = api.fetch_paper(42).await?;
///   println!("{}", paper.title);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{backend::PaperApi, error::PaiperError};
}
