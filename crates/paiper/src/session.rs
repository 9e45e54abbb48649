//! View models for the home and paper pages.
//!
//! [`PaperView`] is plain state changed only through [`PaperView::update`]. A
//! [`PaperSession`] owns one view plus the requests it has in flight: opening a
//! paper fetches it, records it in the history, then starts the crew run and the
//! photo listing concurrently. Requests live in a [`JoinSet`] owned by the
//! session, so dropping the session aborts them and nothing can update a view
//! that is gone.
//!
//! Only the most recent photo note is shown. An upload replaces the local list
//! with just the new photo even though the backend keeps the older ones. Deleting
//! requires an explicit confirmation step ([`PendingDeletion::confirm`]).

use tokio::task::JoinSet;

use super::*;
use crate::{backend::PaperApi, history::HistoryStore};

/// Progress of the AI crew run for the open paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiStatus {
  /// No run in progress; insights are shown if present
  #[default]
  Idle,
  /// The crew is "thinking"
  Loading,
  /// The run failed; insights stay empty
  Error,
}

/// Everything the paper page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperView {
  /// The open paper
  pub paper:    ResearchPaper,
  /// Crew run progress
  pub ai:       AiStatus,
  /// Crew output, empty until a run succeeds
  pub insights: Insights,
  /// Photo note URLs known locally
  pub photos:   Vec<String>,
  /// Last user-facing failure message, e.g. a failed upload
  pub notice:   Option<String>,
  /// Set once the page changed its photos itself; later listings are stale
  photos_local: bool,
}

/// Events that change a [`PaperView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperMsg {
  /// A crew run was started
  InsightsRequested,
  /// The crew run finished
  InsightsLoaded(Insights),
  /// The crew run failed
  InsightsFailed(String),
  /// The photo listing finished
  PhotosLoaded(Vec<String>),
  /// The photo listing failed
  PhotosFailed(String),
  /// A photo was uploaded to the given URL
  PhotoUploaded(String),
  /// An upload failed
  PhotoUploadFailed(String),
  /// The photo at the given URL was deleted
  PhotoDeleted(String),
  /// A deletion failed
  PhotoDeleteFailed(String),
}

impl PaperView {
  /// A fresh view of `paper` with no insights or photos yet.
  pub fn new(paper: ResearchPaper) -> Self {
    Self {
      paper,
      ai: AiStatus::Idle,
      insights: Insights::default(),
      photos: Vec::new(),
      notice: None,
      photos_local: false,
    }
  }

  /// Applies `msg`.
  pub fn update(&mut self, msg: PaperMsg) {
    match msg {
      PaperMsg::InsightsRequested => self.ai = AiStatus::Loading,
      PaperMsg::InsightsLoaded(insights) => {
        self.insights = insights;
        self.ai = AiStatus::Idle;
      },
      PaperMsg::InsightsFailed(message) => {
        warn!("Crew run for paper {} failed: {message}", self.paper.id);
        self.insights = Insights::default();
        self.ai = AiStatus::Error;
      },
      PaperMsg::PhotosLoaded(_) | PaperMsg::PhotosFailed(_) if self.photos_local => {
        debug!("Discarding stale photo listing for paper {}", self.paper.id);
      },
      PaperMsg::PhotosLoaded(photos) => self.photos = photos,
      PaperMsg::PhotosFailed(message) => {
        warn!("Could not load photos of paper {}: {message}", self.paper.id);
        self.photos.clear();
      },
      // Only the newest photo is kept locally, whatever the backend stores.
      PaperMsg::PhotoUploaded(url) => {
        self.photos = vec![url];
        self.photos_local = true;
        self.notice = None;
      },
      PaperMsg::PhotoUploadFailed(message) => {
        error!("Photo upload for paper {} failed: {message}", self.paper.id);
        self.notice = Some("Upload failed.".to_string());
      },
      PaperMsg::PhotoDeleted(url) => {
        self.photos.retain(|photo| *photo != url);
        self.photos_local = true;
        self.notice = None;
      },
      PaperMsg::PhotoDeleteFailed(message) => {
        error!("Deleting photo of paper {} failed: {message}", self.paper.id);
        self.notice = Some("Could not delete the photo.".to_string());
      },
    }
  }

  /// The photo shown on the page: the last non-empty URL.
  pub fn visible_photo(&self) -> Option<&str> {
    self.photos.last().map(String::as_str).filter(|photo| !photo.is_empty())
  }
}

/// An open paper page and its in-flight requests.
pub struct PaperSession {
  /// Backend used for every request of this page
  api:   Arc<dyn PaperApi>,
  /// Current page state
  view:  PaperView,
  /// Requests started on mount, aborted on drop
  tasks: JoinSet<PaperMsg>,
}

impl PaperSession {
  /// Fetches paper `id`, records it in `history` and mounts its page.
  ///
  /// A history failure is logged and does not prevent the page from opening.
  ///
  /// # Errors
  ///
  /// Fails if the paper itself cannot be fetched.
  pub async fn open(api: Arc<dyn PaperApi>, history: &HistoryStore, id: i64) -> Result<Self> {
    let paper =
      api.fetch_paper(id).await.inspect_err(|e| error!("Failed to load paper {id}: {e}"))?;
    match history.record_paper(&paper).await {
      Ok(true) => info!("Added \"{}\" to history", paper.title),
      Ok(false) => {},
      Err(e) => warn!("Could not record paper {id} in history: {e}"),
    }
    Ok(Self::mount(api, paper))
  }

  /// Mounts the page of an already fetched paper, starting the crew run and
  /// the photo listing.
  pub fn mount(api: Arc<dyn PaperApi>, paper: ResearchPaper) -> Self {
    let mut view = PaperView::new(paper);
    view.update(PaperMsg::InsightsRequested);
    let mut tasks = JoinSet::new();

    let (insights_api, paper) = (api.clone(), view.paper.clone());
    tasks.spawn(async move {
      match insights_api.fetch_insights(&paper).await {
        Ok(insights) => PaperMsg::InsightsLoaded(insights),
        Err(e) => PaperMsg::InsightsFailed(e.to_string()),
      }
    });

    let (photos_api, id) = (api.clone(), view.paper.id);
    tasks.spawn(async move {
      match photos_api.list_photos(id).await {
        Ok(photos) => PaperMsg::PhotosLoaded(photos),
        Err(e) => PaperMsg::PhotosFailed(e.to_string()),
      }
    });

    Self { api, view, tasks }
  }

  /// The current page state.
  pub fn view(&self) -> &PaperView { &self.view }

  /// Whether any request started on mount is still running.
  pub fn is_loading(&self) -> bool { !self.tasks.is_empty() }

  /// Waits for the next request to finish and applies its result.
  ///
  /// Returns `None` once nothing is in flight.
  pub async fn next(&mut self) -> Option<&PaperView> {
    match self.tasks.join_next().await? {
      Ok(msg) => self.view.update(msg),
      Err(e) if e.is_cancelled() => debug!("Request of paper {} cancelled", self.view.paper.id),
      Err(e) => error!("Request of paper {} panicked: {e}", self.view.paper.id),
    }
    Some(&self.view)
  }

  /// Waits for every request started on mount.
  pub async fn settle(&mut self) -> &PaperView {
    while self.next().await.is_some() {}
    &self.view
  }

  /// Uploads a photo note; on success it becomes the only photo shown.
  pub async fn upload_photo(&mut self, image: Vec<u8>, file_name: &str) -> Result<()> {
    match self.api.upload_photo(self.view.paper.id, image, file_name).await {
      Ok(url) => {
        self.view.update(PaperMsg::PhotoUploaded(url));
        Ok(())
      },
      Err(e) => {
        self.view.update(PaperMsg::PhotoUploadFailed(e.to_string()));
        Err(e)
      },
    }
  }

  /// Reads an image file and uploads it as a photo note named
  /// [`photo_file_name`].
  pub async fn upload_photo_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
    let image = read_photo(path).await?;
    self.upload_photo(image, &photo_file_name()).await
  }

  /// Starts deleting the visible photo. Nothing is sent until the returned
  /// deletion is confirmed.
  pub fn request_delete(&mut self) -> Option<PendingDeletion<'_>> {
    let photo = self.view.visible_photo()?.to_string();
    Some(PendingDeletion { session: self, photo })
  }
}

/// A photo deletion awaiting user confirmation. Dropping it cancels the deletion.
pub struct PendingDeletion<'a> {
  /// The page the photo belongs to
  session: &'a mut PaperSession,
  /// The photo to delete
  photo:   String,
}

impl PendingDeletion<'_> {
  /// The photo that would be deleted.
  pub fn photo(&self) -> &str { &self.photo }

  /// Deletes the photo on the backend and drops it from the page.
  pub async fn confirm(self) -> Result<()> {
    let Self { session, photo } = self;
    match session.api.delete_photo(session.view.paper.id, &photo).await {
      Ok(()) => {
        session.view.update(PaperMsg::PhotoDeleted(photo));
        Ok(())
      },
      Err(e) => {
        session.view.update(PaperMsg::PhotoDeleteFailed(e.to_string()));
        Err(e)
      },
    }
  }
}

/// Reads an image file for upload.
///
/// A file the user may not read is [`PaiperError::PermissionDenied`].
pub async fn read_photo(path: impl AsRef<Path>) -> Result<Vec<u8>> {
  let path = path.as_ref();
  tokio::fs::read(path).await.map_err(|e| match e.kind() {
    std::io::ErrorKind::PermissionDenied =>
      PaiperError::PermissionDenied(format!("cannot read {}", path.display())),
    _ => PaiperError::Path(e),
  })
}

/// Upload file name for a new photo note, unique per millisecond.
pub fn photo_file_name() -> String { format!("photo_{}.jpg", Utc::now().timestamp_millis()) }

/// The home page: papers to continue reading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeView {
  /// Previously opened papers, oldest first
  pub entries: Vec<HistoryEntry>,
}

impl HomeView {
  /// Loads the home page from `history`.
  pub async fn load(history: &HistoryStore) -> Result<Self> {
    Ok(Self { entries: history.load().await? })
  }

  /// Whether there is nothing to continue.
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
