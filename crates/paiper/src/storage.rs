//! Persisted key-value storage with expiry and sync fallbacks.
//!
//! [`Storage`] keeps JSON documents under string keys in a local SQLite file. It is
//! the durable facility underneath the [`HistoryStore`](crate::history::HistoryStore)
//! and supports:
//!
//! - Values can expire, either through a store-wide default or per save
//! - Reads are served from an in-memory cache once a key has been seen
//! - A key that is absent or expired falls back to a registered *sync producer*, a
//!   zero-argument function whose result is treated as the current value
//!
//! # Examples
//!
//! ```no_run
//! use paiper::storage::Storage;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage =
//!   Storage::builder().with_sync("papers", || json!([])).open(Storage::default_path()).await?;
//!
//! // Nothing saved yet, so the sync producer answers
//! let papers: Vec<String> = storage.load("papers").await?;
//! assert!(papers.is_empty());
//!
//! storage.save("papers", &vec!["first".to_string()]).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Mutex, PoisonError, RwLock};

use rusqlite::params;
use serde_json::Value;
use tokio_rusqlite::Connection;

use super::*;

/// A zero-argument producer consulted when a key is absent or expired.
pub type SyncFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Handle to the local key-value store.
pub struct Storage {
  /// Async SQLite connection handle
  conn:           Connection,
  /// Read cache, `None` when caching is disabled
  cache:          Option<tokio::sync::RwLock<HashMap<String, Record>>>,
  /// Sync producers by key
  sync:           RwLock<HashMap<String, SyncFn>>,
  /// Expiry applied by [`Storage::save`]
  default_expiry: Option<Duration>,
  /// Per-key write locks handed out by [`Storage::writer`]
  writers:        Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Builder for [`Storage`].
pub struct StorageBuilder {
  /// Whether reads are cached in memory
  enable_cache:   bool,
  /// Expiry applied by [`Storage::save`]
  default_expiry: Option<Duration>,
  /// Sync producers registered up front
  sync:           HashMap<String, SyncFn>,
}

/// A stored value together with its expiry.
#[derive(Debug, Clone)]
struct Record {
  /// The stored JSON document
  value:      Value,
  /// Expiry as unix milliseconds, `None` for never
  expires_at: Option<i64>,
}

impl Record {
  /// Whether the record has expired at `now` (unix milliseconds).
  fn is_expired(&self, now: i64) -> bool { self.expires_at.is_some_and(|at| now >= at) }
}

impl Default for StorageBuilder {
  fn default() -> Self { Self { enable_cache: true, default_expiry: None, sync: HashMap::new() } }
}

impl StorageBuilder {
  /// Enables or disables the in-memory read cache. Enabled by default.
  pub fn enable_cache(mut self, enable: bool) -> Self {
    self.enable_cache = enable;
    self
  }

  /// Sets the expiry used by [`Storage::save`]. `None` (the default) never expires.
  pub fn default_expiry(mut self, expiry: Option<Duration>) -> Self {
    self.default_expiry = expiry;
    self
  }

  /// Registers the sync producer for `key`.
  pub fn with_sync<F>(mut self, key: &str, producer: F) -> Self
  where F: Fn() -> Value + Send + Sync + 'static {
    self.sync.insert(key.to_string(), Arc::new(producer));
    self
  }

  /// Opens (or creates) the storage file at `path`.
  ///
  /// Missing parent directories are created.
  pub async fn open(self, path: impl AsRef<Path>) -> Result<Storage> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    debug!("Opening storage at {}", path.display());
    let conn = Connection::open(path).await?;
    self.finish(conn).await
  }

  /// Opens a storage that lives only as long as the returned handle.
  pub async fn open_in_memory(self) -> Result<Storage> {
    let conn = Connection::open_in_memory().await?;
    self.finish(conn).await
  }

  /// Runs the schema migration and assembles the handle.
  async fn finish(self, conn: Connection) -> Result<Storage> {
    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(
          env!("CARGO_MANIFEST_DIR"),
          "/migrations/init.sql"
        )))?;
        Ok(())
      })
      .await?;

    Ok(Storage {
      conn,
      cache: self.enable_cache.then(|| tokio::sync::RwLock::new(HashMap::new())),
      sync: RwLock::new(self.sync),
      default_expiry: self.default_expiry,
      writers: Mutex::new(HashMap::new()),
    })
  }
}

impl Storage {
  /// Starts building a storage handle.
  pub fn builder() -> StorageBuilder { StorageBuilder::default() }

  /// Opens storage at `path` with default settings and no sync producers.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> { Self::builder().open(path).await }

  /// Opens an in-memory storage with default settings.
  pub async fn open_in_memory() -> Result<Self> { Self::builder().open_in_memory().await }

  /// Returns the default path for the storage file.
  ///
  /// The path is constructed as follows:
  /// - On Unix: `~/.local/share/paiper/paiper.db`
  /// - On macOS: `~/Library/Application Support/paiper/paiper.db`
  /// - On Windows: `%APPDATA%\paiper\paiper.db`
  /// - Fallback: `./paiper/paiper.db`
  pub fn default_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("paiper").join("paiper.db")
  }

  /// Registers (or replaces) the sync producer for `key`.
  pub fn register_sync<F>(&self, key: &str, producer: F)
  where F: Fn() -> Value + Send + Sync + 'static {
    self.sync.write().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), Arc::new(producer));
  }

  /// The write lock for `key`.
  ///
  /// Every caller asking for the same key on this storage gets the same lock, so
  /// read-modify-write cycles over one key can be serialized across handles.
  pub fn writer(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
    self
      .writers
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(key.to_string())
      .or_default()
      .clone()
  }

  /// Whether a sync producer is registered for `key`.
  pub fn has_sync(&self, key: &str) -> bool {
    self.sync.read().unwrap_or_else(PoisonError::into_inner).contains_key(key)
  }

  /// Loads the value stored under `key`.
  ///
  /// An absent or expired value is replaced by the result of the key's sync
  /// producer, which is returned without being persisted.
  ///
  /// # Errors
  ///
  /// - [`PaiperError::NotFound`] if the key is absent or expired and has no producer
  /// - [`PaiperError::AsyncSqlite`] if the underlying storage fails
  /// - [`PaiperError::Parse`] if the stored document does not match `T`
  pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
    let now = Utc::now().timestamp_millis();

    if let Some(cache) = &self.cache {
      if let Some(record) = cache.read().await.get(key) {
        if !record.is_expired(now) {
          trace!("Cache hit for \"{key}\"");
          return Ok(serde_json::from_value(record.value.clone())?);
        }
      }
    }

    match self.read_record(key).await? {
      Some(record) if !record.is_expired(now) => {
        let value = serde_json::from_value(record.value.clone())?;
        if let Some(cache) = &self.cache {
          cache.write().await.insert(key.to_string(), record);
        }
        Ok(value)
      },
      Some(_) => {
        debug!("Value for \"{key}\" expired, falling back to sync");
        if let Some(cache) = &self.cache {
          cache.write().await.remove(key);
        }
        self.sync(key)
      },
      None => {
        debug!("No value for \"{key}\", falling back to sync");
        self.sync(key)
      },
    }
  }

  /// Replaces the value under `key`, applying the default expiry.
  pub async fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
    self.save_with_expiry(key, data, self.default_expiry).await
  }

  /// Replaces the value under `key` with an explicit expiry (`None` never expires).
  pub async fn save_with_expiry<T: Serialize + ?Sized>(
    &self,
    key: &str,
    data: &T,
    expiry: Option<Duration>,
  ) -> Result<()> {
    let value = serde_json::to_value(data)?;
    let expires_at = expiry.map(|expiry| {
      let millis = i64::try_from(expiry.as_millis()).unwrap_or(i64::MAX);
      Utc::now().timestamp_millis().saturating_add(millis)
    });
    let text = value.to_string();
    let owned_key = key.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO storage (key, value, expires_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             expires_at = excluded.expires_at,
             updated_at = CURRENT_TIMESTAMP",
          params![owned_key, text, expires_at],
        )?;
        Ok(())
      })
      .await?;
    trace!("Saved \"{key}\": {value}");

    if let Some(cache) = &self.cache {
      cache.write().await.insert(key.to_string(), Record { value, expires_at });
    }
    Ok(())
  }

  /// Removes the value under `key`. Removing an absent key is not an error.
  pub async fn remove(&self, key: &str) -> Result<()> {
    let owned_key = key.to_string();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM storage WHERE key = ?1", [owned_key])?;
        Ok(())
      })
      .await?;
    if let Some(cache) = &self.cache {
      cache.write().await.remove(key);
    }
    Ok(())
  }

  /// Removes every stored value.
  pub async fn clear(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM storage", [])?;
        Ok(())
      })
      .await?;
    if let Some(cache) = &self.cache {
      cache.write().await.clear();
    }
    Ok(())
  }

  /// Reads a record straight from SQLite, bypassing the cache.
  async fn read_record(&self, key: &str) -> Result<Option<Record>> {
    let key = key.to_string();
    let row = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached("SELECT value, expires_at FROM storage WHERE key = ?1")?;
        match stmt.query_row([key], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)))
        {
          Ok(row) => Ok(Some(row)),
          Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    row
      .map(|(text, expires_at)| Ok(Record { value: serde_json::from_str(&text)?, expires_at }))
      .transpose()
  }

  /// Runs the sync producer for `key`.
  fn sync<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
    let producer = self.sync.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned();
    match producer {
      Some(producer) => Ok(serde_json::from_value(producer())?),
      None => Err(PaiperError::NotFound(key.to_string())),
    }
  }
}
