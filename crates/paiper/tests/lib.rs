use std::sync::Arc;

use paiper::{
  backend::Backend,
  error::PaiperError,
  history::HistoryStore,
  paper::{HistoryEntry, Insights},
  prelude::*,
  search::{SearchController, SearchState},
  session::{AiStatus, HomeView, PaperSession},
};
use tempfile::{tempdir, TempDir};
use tracing_test::traced_test;

use crate::mock::MockBackend;

mod mock;
mod workflows;

pub type TestResult<T> = anyhow::Result<T>;

/// A history persisted in a fresh temporary directory.
pub async fn create_test_history() -> (HistoryStore, TempDir) {
  let dir = tempdir().unwrap();
  let history = HistoryStore::open(dir.path().join("paiper.db")).await.unwrap();
  (history, dir)
}

/// A real HTTP client pointed at a freshly started mock backend.
pub async fn create_test_backend() -> (Arc<Backend>, MockBackend) {
  let mock = MockBackend::start().await;
  (Arc::new(Backend::new(mock.url.clone())), mock)
}
