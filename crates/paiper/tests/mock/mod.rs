//! A local stand-in for the pAIper backend.
//!
//! Serves the same routes as the real service on an ephemeral port. Paper 42 is
//! "Foo", paper 7 has every optional field set to `null`, any other id is a 404.
//! Search answers depend on the query:
//!
//! - `nothing`: no results
//! - `explode`: HTTP 500
//! - `offline`: HTTP 200 carrying `{"error": ...}`
//! - anything else: two results
//!
//! Crew runs fail for papers titled "Broken".

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use axum::{
  extract::{Multipart, Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

/// Everything the mock has been sent.
#[derive(Clone, Default)]
pub struct MockState {
  /// Stored photo paths per paper
  pub photos:        Arc<Mutex<HashMap<i64, Vec<String>>>>,
  /// Bodies of every crew run request
  pub crew_requests: Arc<Mutex<Vec<Value>>>,
  /// `(field, file name, size)` of every uploaded part
  pub uploads:       Arc<Mutex<Vec<(String, String, usize)>>>,
}

pub struct MockBackend {
  pub url:   Url,
  pub state: MockState,
}

impl MockBackend {
  pub async fn start() -> Self {
    let state = MockState::default();
    let app = Router::new()
      .route("/v1/paper/{id}", get(paper))
      .route("/v1/paper/{id}/photos", get(list_photos).delete(delete_photo))
      .route("/v1/search", get(search))
      .route("/v1/crew/run", post(crew_run))
      .route("/v1/upload-photo", post(upload_photo))
      .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    Self { url: Url::parse(&format!("http://{addr}")).unwrap(), state }
  }

  pub fn seed_photos(&self, paper_id: i64, photos: &[&str]) {
    self
      .state
      .photos
      .lock()
      .unwrap()
      .insert(paper_id, photos.iter().map(|photo| photo.to_string()).collect());
  }

  pub fn stored_photos(&self, paper_id: i64) -> Vec<String> {
    self.state.photos.lock().unwrap().get(&paper_id).cloned().unwrap_or_default()
  }
}

async fn paper(Path(id): Path<i64>) -> Response {
  match id {
    42 => Json(json!({
      "id": 42,
      "title": "Foo",
      "authors": [{"name": "Ada"}, {"name": "Alan"}],
      "abstract": "We study foo.",
      "fullText": "",
      "downloadUrl": "https://example.org/foo.pdf",
      "publishedDate": "2019-05-01T00:00:00"
    }))
    .into_response(),
    7 => Json(json!({
      "id": 7,
      "title": "Broken",
      "authors": null,
      "abstract": null,
      "fullText": null,
      "downloadUrl": null,
      "publishedDate": null
    }))
    .into_response(),
    _ => (StatusCode::NOT_FOUND, "no such paper").into_response(),
  }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
  match params.get("query").map(String::as_str).unwrap_or_default() {
    "nothing" => Json(json!({ "results": [] })).into_response(),
    "explode" => (StatusCode::INTERNAL_SERVER_ERROR, "index down").into_response(),
    "offline" => Json(json!({ "error": "search index offline" })).into_response(),
    _ => Json(json!({
      "results": [
        {"id": 42, "title": "Foo", "authors": [{"name": "Ada"}, {"name": "Alan"}]},
        {"title": "Bar", "authors": null}
      ]
    }))
    .into_response(),
  }
}

async fn crew_run(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
  state.crew_requests.lock().unwrap().push(body.clone());
  let title = body["title"].as_str().unwrap_or_default().to_string();
  if title == "Broken" {
    return (StatusCode::INTERNAL_SERVER_ERROR, "crew crashed").into_response();
  }
  Json(json!({
    "summarizer_output": format!("Summary of {title}"),
    "takeaway_output": format!("Takeaway of {title}"),
    "citator_output": format!("Citation of {title}")
  }))
  .into_response()
}

async fn list_photos(State(state): State<MockState>, Path(id): Path<i64>) -> Json<Value> {
  let photos = state.photos.lock().unwrap().get(&id).cloned().unwrap_or_default();
  Json(json!({ "photoUrls": photos }))
}

async fn upload_photo(
  State(state): State<MockState>,
  Query(params): Query<HashMap<String, String>>,
  mut multipart: Multipart,
) -> Response {
  let Some(paper_id) = params.get("paper_id").and_then(|id| id.parse::<i64>().ok()) else {
    return (StatusCode::BAD_REQUEST, "missing paper_id").into_response();
  };
  let mut stored = None;
  while let Ok(Some(field)) = multipart.next_field().await {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().unwrap_or("upload.jpg").to_string();
    let Ok(bytes) = field.bytes().await else {
      return (StatusCode::BAD_REQUEST, "unreadable part").into_response();
    };
    state.uploads.lock().unwrap().push((name.clone(), file_name.clone(), bytes.len()));
    if name == "photo" {
      stored = Some(format!("/uploads/{paper_id}/{file_name}"));
    }
  }
  let Some(path) = stored else {
    return (StatusCode::BAD_REQUEST, "missing photo part").into_response();
  };
  state.photos.lock().unwrap().entry(paper_id).or_default().push(path.clone());
  Json(json!({ "url": path })).into_response()
}

async fn delete_photo(
  State(state): State<MockState>,
  Path(id): Path<i64>,
  Query(params): Query<HashMap<String, String>>,
) -> Response {
  let Some(target) = params.get("photoUrl") else {
    return (StatusCode::BAD_REQUEST, "missing photoUrl").into_response();
  };
  let mut photos = state.photos.lock().unwrap();
  let stored = photos.entry(id).or_default();
  let before = stored.len();
  stored.retain(|photo| photo != target);
  if stored.len() == before {
    return (StatusCode::NOT_FOUND, "no such photo").into_response();
  }
  Json(json!({ "deleted": target })).into_response()
}
