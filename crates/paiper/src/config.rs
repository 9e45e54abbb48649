//! User configuration.
//!
//! Configuration lives in a TOML file at [`Config::default_path`]. Every field has
//! a default, so a missing or partial file is fine. The backend URL can always be
//! overridden through the [`BACKEND_URL_VAR`] environment variable, which is read
//! each time [`Config::backend_url`] is called.
//!
//! ```toml
//! backend_url = "https://paiper.example.org"
//! database_path = "/home/me/.local/share/paiper/paiper.db"
//! search_debounce_ms = 500
//! ```

use super::*;
use crate::storage::Storage;

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_VAR: &str = "PAIPER_BACKEND_URL";

/// Debounce window applied to search input when nothing else is configured.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL of the pAIper backend
  #[serde(skip_serializing_if = "Option::is_none")]
  pub backend_url:        Option<Url>,
  /// Where the local storage file lives
  pub database_path:      PathBuf,
  /// Debounce window for search input, in milliseconds
  pub search_debounce_ms: u64,
  /// Directory for rolling log files; logs go to stderr when unset
  #[serde(skip_serializing_if = "Option::is_none")]
  pub log_dir:            Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      backend_url:        None,
      database_path:      Storage::default_path(),
      search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
      log_dir:            None,
    }
  }
}

impl Config {
  /// Returns the default path of the configuration file.
  ///
  /// - On Unix: `~/.config/paiper/config.toml`
  /// - On macOS: `~/Library/Application Support/paiper/config.toml`
  /// - On Windows: `%APPDATA%\paiper\config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("paiper").join("config.toml")
  }

  /// Loads the configuration from [`Config::default_path`].
  pub fn load() -> Result<Self> { Self::load_from(Self::default_path()) }

  /// Loads the configuration from `path`, using defaults if the file does not exist.
  pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No configuration at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
  }

  /// Writes the configuration to `path`, creating parent directories.
  pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Sets the backend base URL.
  pub fn with_backend_url(mut self, url: Url) -> Self {
    self.backend_url = Some(url);
    self
  }

  /// Sets the storage file location.
  pub fn with_database_path(mut self, path: &Path) -> Self {
    self.database_path = path.to_path_buf();
    self
  }

  /// Sets the search debounce window.
  pub fn with_search_debounce(mut self, window: Duration) -> Self {
    self.search_debounce_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
    self
  }

  /// Sets the log directory.
  pub fn with_log_dir(mut self, path: &Path) -> Self {
    self.log_dir = Some(path.to_path_buf());
    self
  }

  /// Resolves the backend URL, preferring [`BACKEND_URL_VAR`] over the file.
  pub fn backend_url(&self) -> Result<Url> {
    match std::env::var(BACKEND_URL_VAR) {
      Ok(raw) if !raw.trim().is_empty() => Ok(Url::parse(raw.trim())?),
      _ => self.backend_url.clone().ok_or_else(|| {
        PaiperError::Config(format!(
          "No backend URL configured. Set {BACKEND_URL_VAR} or `backend_url` in {}",
          Self::default_path().display()
        ))
      }),
    }
  }

  /// The search debounce window.
  pub fn search_debounce(&self) -> Duration { Duration::from_millis(self.search_debounce_ms) }
}
