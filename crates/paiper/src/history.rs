//! History of previously opened papers.
//!
//! The history is a single ordered list of [`HistoryEntry`] values kept under the
//! `"papers"` key of a [`Storage`]. It backs the "continue where you left off" list:
//! a paper is appended the first time it is opened and never touched again.
//!
//! Appending is a read-modify-write. [`HistoryStore::record_if_new`] runs it behind
//! the storage's write lock for [`HISTORY_KEY`], shared by every store over the same
//! [`Storage`], so two papers opened at the same moment cannot both observe
//! "absent" and append a duplicate.
//!
//! # Examples
//!
//! ```no_run
//! use paiper::history::HistoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let history = HistoryStore::open(HistoryStore::default_path()).await?;
//! assert!(history.record_if_new(42, "Foo").await?);
//! assert!(!history.record_if_new(42, "Foo").await?);
//! assert_eq!(history.load().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use tokio::sync::Mutex;

use super::*;
use crate::storage::Storage;

/// Storage key holding the history list.
pub const HISTORY_KEY: &str = "papers";

/// Handle to the persisted paper history.
///
/// Cloning is cheap. Every handle over the same storage shares one writer lock.
#[derive(Clone)]
pub struct HistoryStore {
  /// Backing key-value storage
  storage: Arc<Storage>,
  /// Serializes read-modify-write cycles
  writer:  Arc<Mutex<()>>,
}

impl HistoryStore {
  /// Opens the history at `path`, creating the storage file if needed.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self::new(Arc::new(Storage::open(path).await?)))
  }

  /// Opens a history that is discarded when the last handle is dropped.
  pub async fn open_in_memory() -> Result<Self> {
    Ok(Self::new(Arc::new(Storage::open_in_memory().await?)))
  }

  /// Wraps an existing storage, registering the empty-list sync producer for
  /// [`HISTORY_KEY`] if none is registered yet.
  pub fn new(storage: Arc<Storage>) -> Self {
    if !storage.has_sync(HISTORY_KEY) {
      storage.register_sync(HISTORY_KEY, || Value::Array(Vec::new()));
    }
    let writer = storage.writer(HISTORY_KEY);
    Self { storage, writer }
  }

  /// Default location of the history storage file, see [`Storage::default_path`].
  pub fn default_path() -> PathBuf { Storage::default_path() }

  /// The underlying storage.
  pub fn storage(&self) -> &Arc<Storage> { &self.storage }

  /// Returns the recorded papers in the order they were first opened.
  ///
  /// A history that was never written reads as empty.
  pub async fn load(&self) -> Result<Vec<HistoryEntry>> {
    self.storage.load(HISTORY_KEY).await.inspect_err(|e| error!("Failed to load history: {e}"))
  }

  /// Replaces the recorded papers with `entries`.
  pub async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
    self.storage.save(HISTORY_KEY, entries).await.inspect_err(|e| error!("Failed to save history: {e}"))
  }

  /// Appends `{id, title}` unless a paper with `id` is already recorded.
  ///
  /// Returns `true` when the entry was appended.
  pub async fn record_if_new(&self, id: i64, title: &str) -> Result<bool> {
    let _guard = self.writer.lock().await;

    let mut entries = self.load().await?;
    if entries.iter().any(|entry| entry.id == id) {
      trace!("Paper {id} already in history");
      return Ok(false);
    }

    entries.push(HistoryEntry { id, title: title.to_string() });
    self.save(&entries).await?;
    debug!("Recorded paper {id} in history");
    Ok(true)
  }

  /// Records `paper` if it is not in the history yet.
  pub async fn record_paper(&self, paper: &ResearchPaper) -> Result<bool> {
    self.record_if_new(paper.id, &paper.title).await
  }

  /// Forgets every recorded paper.
  pub async fn clear(&self) -> Result<()> {
    let _guard = self.writer.lock().await;
    self.storage.remove(HISTORY_KEY).await
  }
}
