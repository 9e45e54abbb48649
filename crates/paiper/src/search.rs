//! Debounced paper search.
//!
//! Search is modelled as a small state machine. [`SearchState::update`] is the pure
//! transition function over [`SearchMsg`]; [`SearchController`] drives it from
//! keystroke-level input:
//!
//! - Input is debounced; each keystroke restarts the window and only the last query
//!   in a window reaches the backend
//! - An empty query returns to [`SearchState::Idle`] without a request
//! - New input while a request is in flight abandons that request
//! - Zero results is [`SearchState::NotFound`], distinct from [`SearchState::Error`]
//!
//! # Examples
//!
//! ```no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use paiper::{
//!   backend::Backend,
//!   search::{SearchController, SearchState},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Arc::new(Backend::from_env()?);
//! let mut search = SearchController::spawn(backend, Duration::from_millis(500));
//!
//! for prefix in ["q", "qu", "quantum"] {
//!   search.input(prefix);
//! }
//! let state = search.settled().await;
//! if let SearchState::Results { results, .. } = state {
//!   println!("{} papers found", results.len());
//! }
//! # Ok(())
//! # }
//! ```

use tokio::{
  sync::{mpsc, watch},
  task::JoinHandle,
};

use super::*;
use crate::backend::PaperApi;

/// Where a search currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchState {
  /// Nothing to search for
  #[default]
  Idle,
  /// A request for `query` is in flight
  Searching {
    /// The query being searched
    query: String,
  },
  /// The backend returned at least one result
  Results {
    /// The query the results belong to
    query:   String,
    /// Matching papers
    results: Vec<SearchResult>,
  },
  /// The backend answered but found nothing
  NotFound {
    /// The query that found nothing
    query: String,
  },
  /// The request failed
  Error {
    /// The query that failed
    query:   String,
    /// Human-readable failure description
    message: String,
  },
}

/// Events driving [`SearchState`].
#[derive(Debug)]
pub enum SearchMsg {
  /// The (debounced) query text changed
  QueryChanged(String),
  /// A request for `query` finished
  Completed {
    /// The query the request was made for
    query:   String,
    /// What the backend returned
    outcome: Result<Vec<SearchResult>>,
  },
}

impl SearchState {
  /// Applies `msg` and returns the query to send to the backend, if any.
  ///
  /// Completions for anything but the query currently being searched are stale and
  /// ignored.
  pub fn update(&mut self, msg: SearchMsg) -> Option<String> {
    match msg {
      SearchMsg::QueryChanged(query) => {
        let query = query.trim();
        if query.is_empty() {
          *self = Self::Idle;
          None
        } else {
          *self = Self::Searching { query: query.to_string() };
          Some(query.to_string())
        }
      },
      SearchMsg::Completed { query, outcome } => {
        if !matches!(self, Self::Searching { query: current } if *current == query) {
          debug!("Discarding stale results for \"{query}\"");
          return None;
        }
        *self = match outcome {
          Ok(results) if results.is_empty() => Self::NotFound { query },
          Ok(results) => Self::Results { query, results },
          Err(e) => {
            error!("Search for \"{query}\" failed: {e}");
            Self::Error { query, message: e.to_string() }
          },
        };
        None
      },
    }
  }

  /// Whether the state is final for its query, i.e. not [`SearchState::Searching`].
  pub fn is_settled(&self) -> bool { !matches!(self, Self::Searching { .. }) }
}

impl Display for SearchState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Idle => write!(f, "Type to search for papers"),
      Self::Searching { query } => write!(f, "Searching for \"{query}\"..."),
      Self::Results { query, results } =>
        write!(f, "{} results for \"{query}\"", results.len()),
      Self::NotFound { query } => write!(f, "No papers found for \"{query}\""),
      Self::Error { query, message } => write!(f, "Search for \"{query}\" failed: {message}"),
    }
  }
}

/// Runs debounced searches in a background task.
///
/// Dropping the controller stops the task and abandons any request in flight.
pub struct SearchController {
  /// Keystroke-level query input
  input: mpsc::UnboundedSender<String>,
  /// Published search state
  state: watch::Receiver<SearchState>,
  /// The debounce loop
  task:  JoinHandle<()>,
}

impl SearchController {
  /// Starts a controller that searches through `api` after `debounce` of quiet input.
  pub fn spawn(api: Arc<dyn PaperApi>, debounce: Duration) -> Self {
    let (input, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(SearchState::Idle);
    let task = tokio::spawn(run(api, debounce, input_rx, state_tx));
    Self { input, state, task }
  }

  /// Feeds the current query text, typically once per keystroke.
  pub fn input(&self, query: impl Into<String>) {
    if self.input.send(query.into()).is_err() {
      warn!("Search task is no longer running");
    }
  }

  /// The latest state.
  pub fn state(&self) -> SearchState { self.state.borrow().clone() }

  /// A receiver that observes every state change.
  pub fn subscribe(&self) -> watch::Receiver<SearchState> { self.state.clone() }

  /// Waits for the next state change, returning `None` once the task has stopped.
  pub async fn changed(&mut self) -> Option<SearchState> {
    self.state.changed().await.ok()?;
    Some(self.state.borrow_and_update().clone())
  }

  /// Waits until the state changes and is no longer [`SearchState::Searching`].
  ///
  /// Returns the current state if the task stops first.
  pub async fn settled(&mut self) -> SearchState {
    while let Some(state) = self.changed().await {
      if state.is_settled() {
        return state;
      }
    }
    self.state()
  }
}

impl Drop for SearchController {
  fn drop(&mut self) { self.task.abort(); }
}

/// The debounce loop behind [`SearchController`].
async fn run(
  api: Arc<dyn PaperApi>,
  debounce: Duration,
  mut input: mpsc::UnboundedReceiver<String>,
  state: watch::Sender<SearchState>,
) {
  let mut carried = None;
  loop {
    let mut latest = match carried.take() {
      Some(query) => query,
      None => match input.recv().await {
        Some(query) => query,
        None => return,
      },
    };

    loop {
      tokio::select! {
        next = input.recv() => match next {
          Some(query) => latest = query,
          None => return,
        },
        () = tokio::time::sleep(debounce) => break,
      }
    }

    let mut request = None;
    state.send_modify(|s| request = s.update(SearchMsg::QueryChanged(latest)));
    let Some(query) = request else { continue };

    tokio::select! {
      outcome = api.search(&query) => {
        state.send_modify(|s| {
          s.update(SearchMsg::Completed { query, outcome });
        });
      },
      next = input.recv() => match next {
        Some(next) => {
          debug!("Search for \"{query}\" superseded by new input");
          carried = Some(next);
        },
        None => return,
      },
    }
  }
}
