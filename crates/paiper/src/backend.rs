//! REST client for the pAIper backend.
//!
//! Every operation is a single request/response pair with no retries; failures
//! are returned to the caller, which decides how to present them.
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/v1/paper/{id}` | [`PaperApi::fetch_paper`] |
//! | GET | `/v1/search?query=` | [`PaperApi::search`] |
//! | POST | `/v1/crew/run` | [`PaperApi::fetch_insights`] |
//! | GET | `/v1/paper/{id}/photos` | [`PaperApi::list_photos`] |
//! | POST | `/v1/upload-photo?paper_id=` | [`PaperApi::upload_photo`] |
//! | DELETE | `/v1/paper/{id}/photos?photoUrl=` | [`PaperApi::delete_photo`] |
//!
//! # Examples
//!
//! ```no_run
//! use paiper::{backend::Backend, prelude::*};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = Backend::new("http://localhost:8000".parse()?);
//! for result in backend.search("graph neural networks").await? {
//!   println!("{} ({})", result.title, result.author_names());
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{
  multipart::{Form, Part},
  Response,
};
use serde_json::Value;

use super::*;
use crate::config::{Config, BACKEND_URL_VAR};

/// Operations the client needs from the backend.
///
/// [`Backend`] is the HTTP implementation; controllers in [`search`](crate::search)
/// and [`session`](crate::session) only depend on this trait.
#[async_trait]
pub trait PaperApi: Send + Sync {
  /// Retrieves the full record of paper `id`.
  async fn fetch_paper(&self, id: i64) -> Result<ResearchPaper>;

  /// Searches for papers matching `query`.
  async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

  /// Runs the AI crew over `paper` and returns its three texts.
  ///
  /// This can take a long time; there is no progress reporting.
  async fn fetch_insights(&self, paper: &ResearchPaper) -> Result<Insights>;

  /// Lists the photo URLs attached to paper `paper_id`.
  async fn list_photos(&self, paper_id: i64) -> Result<Vec<String>>;

  /// Uploads a photo note and returns its absolute URL.
  async fn upload_photo(&self, paper_id: i64, image: Vec<u8>, file_name: &str) -> Result<String>;

  /// Deletes the photo at `photo_url` from paper `paper_id`.
  async fn delete_photo(&self, paper_id: i64, photo_url: &str) -> Result<()>;
}

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct Backend {
  /// Shared connection pool
  http: reqwest::Client,
  /// Base URL every path is appended to
  base: Url,
}

/// Request body of `POST /v1/crew/run`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CrewRequest<'a> {
  /// Text the crew works from, the paper's abstract
  pub paper_content: &'a str,
  /// Author names joined with commas
  pub authors:       String,
  /// Paper title
  pub title:         &'a str,
  /// Journal name, always empty
  pub journal:       &'a str,
  /// Publication year, empty when unknown
  pub year:          String,
}

/// Response body of `POST /v1/crew/run`.
#[derive(Debug, Deserialize)]
struct CrewResponse {
  /// Summary text
  summarizer_output: String,
  /// Takeaway text
  takeaway_output:   String,
  /// Citation text
  citator_output:    String,
}

/// Response body of `GET /v1/search`.
#[derive(Debug, Deserialize)]
struct SearchResponse {
  /// Matching papers
  #[serde(default)]
  results: Vec<SearchResult>,
}

/// Response body of `GET /v1/paper/{id}/photos`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotosResponse {
  /// Photo URLs, usually relative to the backend
  #[serde(default)]
  photo_urls: Vec<String>,
}

/// Response body of `POST /v1/upload-photo`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
  /// URL of the stored photo, relative to the backend
  url: String,
}

impl<'a> From<&'a ResearchPaper> for CrewRequest<'a> {
  fn from(paper: &'a ResearchPaper) -> Self {
    Self {
      paper_content: &paper.abstract_text,
      authors:       join_names(&paper.authors, ","),
      title:         &paper.title,
      journal:       "",
      year:          paper.year().map(|year| year.to_string()).unwrap_or_default(),
    }
  }
}

impl From<CrewResponse> for Insights {
  fn from(response: CrewResponse) -> Self {
    Self {
      summary:  response.summarizer_output,
      takeaway: response.takeaway_output,
      citation: response.citator_output,
    }
  }
}

impl Backend {
  /// Creates a client for the backend at `base`.
  pub fn new(base: Url) -> Self { Self { http: reqwest::Client::new(), base } }

  /// Creates a client from [`BACKEND_URL_VAR`], read at the time of the call.
  pub fn from_env() -> Result<Self> {
    let raw = std::env::var(BACKEND_URL_VAR)
      .map_err(|_| PaiperError::Config(format!("{BACKEND_URL_VAR} is not set")))?;
    Ok(Self::new(Url::parse(raw.trim())?))
  }

  /// Creates a client from the configuration, see [`Config::backend_url`].
  pub fn from_config(config: &Config) -> Result<Self> { Ok(Self::new(config.backend_url()?)) }

  /// The backend base URL.
  pub fn base_url(&self) -> &Url { &self.base }

  /// Appends `path` to the base URL.
  ///
  /// The base may carry a path prefix of its own, so this concatenates rather than
  /// using [`Url::join`], which would replace it.
  fn endpoint(&self, path: &str) -> Result<Url> {
    Ok(Url::parse(&format!("{}{path}", self.base.as_str().trim_end_matches('/')))?)
  }

  /// Turns a backend-relative photo URL into an absolute one.
  ///
  /// URLs that are already absolute are returned unchanged.
  pub fn resolve_photo_url(&self, photo_url: &str) -> Result<String> {
    if photo_url.starts_with("http://") || photo_url.starts_with("https://") {
      return Ok(photo_url.to_string());
    }
    let separator = if photo_url.starts_with('/') { "" } else { "/" };
    Ok(self.endpoint(&format!("{separator}{photo_url}"))?.to_string())
  }

  /// The path component of a photo URL, which is what the delete endpoint expects.
  pub fn relative_photo_path(&self, photo_url: &str) -> Result<String> {
    Ok(self.base.join(photo_url)?.path().to_string())
  }
}

#[async_trait]
impl PaperApi for Backend {
  async fn fetch_paper(&self, id: i64) -> Result<ResearchPaper> {
    let url = self.endpoint(&format!("/v1/paper/{id}"))?;
    debug!("Fetching paper {id} via: {url}");
    decode(self.http.get(url).send().await?).await
  }

  async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
    let url = self.endpoint("/v1/search")?;
    debug!("Searching for \"{query}\" via: {url}");
    let response: SearchResponse =
      decode(self.http.get(url).query(&[("query", query)]).send().await?).await?;
    Ok(response.results)
  }

  async fn fetch_insights(&self, paper: &ResearchPaper) -> Result<Insights> {
    let url = self.endpoint("/v1/crew/run")?;
    let body = CrewRequest::from(paper);
    debug!("Requesting insights for paper {} via: {url}", paper.id);
    let response: CrewResponse = decode(self.http.post(url).json(&body).send().await?).await?;
    Ok(response.into())
  }

  async fn list_photos(&self, paper_id: i64) -> Result<Vec<String>> {
    let url = self.endpoint(&format!("/v1/paper/{paper_id}/photos"))?;
    debug!("Listing photos of paper {paper_id} via: {url}");
    let response: PhotosResponse = decode(self.http.get(url).send().await?).await?;
    Ok(response.photo_urls)
  }

  async fn upload_photo(&self, paper_id: i64, image: Vec<u8>, file_name: &str) -> Result<String> {
    let url = self.endpoint("/v1/upload-photo")?;
    debug!("Uploading {file_name} ({} bytes) to paper {paper_id} via: {url}", image.len());
    let part = Part::bytes(image).file_name(file_name.to_string()).mime_str("image/jpeg")?;
    let form = Form::new().part("photo", part);
    let response: UploadResponse = decode(
      self.http.post(url).query(&[("paper_id", paper_id)]).multipart(form).send().await?,
    )
    .await?;
    self.resolve_photo_url(&response.url)
  }

  async fn delete_photo(&self, paper_id: i64, photo_url: &str) -> Result<()> {
    let url = self.endpoint(&format!("/v1/paper/{paper_id}/photos"))?;
    let relative = self.relative_photo_path(photo_url)?;
    debug!("Deleting photo {relative} of paper {paper_id} via: {url}");
    let response = self.http.delete(url).query(&[("photoUrl", relative.as_str())]).send().await?;
    check_status(response).await.map(|_| ())
  }
}

/// Fails with [`PaiperError::Status`] unless the response is a success, returning
/// the body otherwise.
async fn check_status(response: Response) -> Result<Vec<u8>> {
  let status = response.status();
  let body = response.bytes().await?.to_vec();
  trace!("Response {status}: {}", String::from_utf8_lossy(&body));
  if !status.is_success() {
    return Err(PaiperError::Status {
      status: status.as_u16(),
      body:   String::from_utf8_lossy(&body).into_owned(),
    });
  }
  Ok(body)
}

/// Decodes a successful JSON response, surfacing `{"error": ...}` bodies as
/// [`PaiperError::Backend`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
  let body = check_status(response).await?;
  let value: Value = serde_json::from_slice(&body)?;
  if let Some(message) = value.as_object().and_then(|object| object.get("error")) {
    let message = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());
    warn!("Backend reported an error: {message}");
    return Err(PaiperError::Backend(message));
  }
  Ok(serde_json::from_value(value)?)
}


#[cfg(test)]
mod tests {
  use super::*;

  fn backend(base: &str) -> Backend { Backend::new(Url::parse(base).unwrap()) }

  #[test]
  fn test_endpoint_keeps_base_path() {
    let prefixed = backend("https://example.org/api/");
    assert_eq!(
      prefixed.endpoint("/v1/paper/3").unwrap().as_str(),
      "https://example.org/api/v1/paper/3"
    );

    let bare = backend("http://localhost:8000");
    assert_eq!(bare.endpoint("/v1/search").unwrap().as_str(), "http://localhost:8000/v1/search");
  }

  #[test]
  fn test_resolve_photo_url() {
    let backend = backend("http://localhost:8000");
    assert_eq!(
      backend.resolve_photo_url("/uploads/42/photo_1.jpg").unwrap(),
      "http://localhost:8000/uploads/42/photo_1.jpg"
    );
    assert_eq!(
      backend.resolve_photo_url("uploads/42/photo_1.jpg").unwrap(),
      "http://localhost:8000/uploads/42/photo_1.jpg"
    );
    assert_eq!(
      backend.resolve_photo_url("https://cdn.example.org/p.jpg").unwrap(),
      "https://cdn.example.org/p.jpg"
    );
  }

  #[test]
  fn test_relative_photo_path() {
    let backend = backend("http://localhost:8000");
    assert_eq!(
      backend.relative_photo_path("http://localhost:8000/uploads/42/p.jpg").unwrap(),
      "/uploads/42/p.jpg"
    );
    assert_eq!(backend.relative_photo_path("/uploads/42/p.jpg").unwrap(), "/uploads/42/p.jpg");
  }

  #[test]
  fn test_crew_request_from_paper() {
    let paper = ResearchPaper {
      id: 1,
      title: "Foo".to_string(),
      authors: vec![Author { name: "Ada".to_string() }, Author { name: "Alan".to_string() }],
      abstract_text: "An abstract.".to_string(),
      published_date: "2018-02-03T00:00:00".to_string(),
      ..ResearchPaper::default()
    };
    let request = CrewRequest::from(&paper);
    assert_eq!(request, CrewRequest {
      paper_content: "An abstract.",
      authors:       "Ada,Alan".to_string(),
      title:         "Foo",
      journal:       "",
      year:          "2018".to_string(),
    });

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["paper_content"], "An abstract.");
    assert_eq!(json["journal"], "");
  }

  #[test]
  fn test_crew_request_unknown_year() {
    let paper = ResearchPaper { published_date: "n/a".to_string(), ..ResearchPaper::default() };
    assert_eq!(CrewRequest::from(&paper).year, "");
  }

  #[test]
  fn test_crew_response_into_insights() {
    let response: CrewResponse = serde_json::from_str(
      r#"{"summarizer_output": "S", "takeaway_output": "T", "citator_output": "C"}"#,
    )
    .unwrap();
    assert_eq!(Insights::from(response), Insights {
      summary:  "S".to_string(),
      takeaway: "T".to_string(),
      citation: "C".to_string(),
    });
  }

  #[test]
  fn test_photos_response_tolerates_missing_list() {
    let response: PhotosResponse = serde_json::from_str("{}").unwrap();
    assert!(response.photo_urls.is_empty());
  }
}
