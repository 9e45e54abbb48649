//! Paper metadata types exchanged with the backend.
//!
//! The backend speaks camelCase JSON for full papers and plain `{title, authors}`
//! records for search results. Upstream sources frequently leave text fields
//! `null`, so every text field here decodes `null` as an empty string.
//!
//! # Examples
//!
//! ```
//! use paiper::paper::ResearchPaper;
//!
//! let paper: ResearchPaper = serde_json::from_str(
//!   r#"{"id": 42, "title": "Foo", "authors": [{"name": "Ada"}, {"name": "Alan"}],
//!       "abstract": null, "fullText": "", "downloadUrl": "https://example.org/foo.pdf",
//!       "publishedDate": "2019-05-01T00:00:00"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(paper.author_names(), "Ada, Alan");
//! assert_eq!(paper.year(), Some(2019));
//! assert!(paper.abstract_text.is_empty());
//! ```

use super::*;

/// A complete paper as returned by `GET /v1/paper/{id}`.
///
/// Papers are transient: they are fetched fresh for every detail view and only
/// their `{id, title}` projection is ever persisted (see [`HistoryEntry`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchPaper {
  /// Backend identifier of the paper
  pub id:             i64,
  /// The paper's full title
  #[serde(default, deserialize_with = "null_as_default")]
  pub title:          String,
  /// Authors in publication order
  #[serde(default, deserialize_with = "null_as_default")]
  pub authors:        Vec<Author>,
  /// Abstract text
  #[serde(rename = "abstract", default, deserialize_with = "null_as_default")]
  pub abstract_text:  String,
  /// Extracted full text, often empty
  #[serde(default, deserialize_with = "null_as_default")]
  pub full_text:      String,
  /// Where the PDF can be downloaded
  #[serde(default, deserialize_with = "null_as_default")]
  pub download_url:   String,
  /// ISO-8601 publication date as delivered by the backend
  #[serde(default, deserialize_with = "null_as_default")]
  pub published_date: String,
}

/// A paper author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
  /// Author's full name
  #[serde(default, deserialize_with = "null_as_default")]
  pub name: String,
}

/// A lightweight search hit from `GET /v1/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
  /// Backend identifier, when the backend supplies one
  #[serde(default)]
  pub id:      Option<i64>,
  /// The paper's title
  #[serde(default, deserialize_with = "null_as_default")]
  pub title:   String,
  /// Authors in publication order
  #[serde(default, deserialize_with = "null_as_default")]
  pub authors: Vec<Author>,
}

/// Minimal record of a previously opened paper.
///
/// Entries are created the first time a paper is opened and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
  /// Backend identifier of the paper
  pub id:    i64,
  /// Title at the time the paper was first opened
  pub title: String,
}

/// The three AI-generated texts produced by a crew run.
///
/// All three start out empty and are only ever replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
  /// Short summary of the paper
  pub summary:  String,
  /// Key takeaways
  pub takeaway: String,
  /// Example citation
  pub citation: String,
}

impl ResearchPaper {
  /// Author names joined for display, e.g. `"Ada, Alan"`.
  pub fn author_names(&self) -> String { join_names(&self.authors, ", ") }

  /// Calendar year of [`published_date`](Self::published_date), if it parses.
  pub fn year(&self) -> Option<i32> { parse_date(&self.published_date).map(|d| d.year()) }

  /// Publication date rendered as `DD.MM.YYYY`, falling back to the raw string.
  pub fn formatted_date(&self) -> String {
    parse_date(&self.published_date)
      .map(|d| d.format("%d.%m.%Y").to_string())
      .unwrap_or_else(|| self.published_date.clone())
  }
}

impl SearchResult {
  /// Author names joined for display.
  pub fn author_names(&self) -> String { join_names(&self.authors, ", ") }
}

impl From<&ResearchPaper> for HistoryEntry {
  fn from(paper: &ResearchPaper) -> Self { Self { id: paper.id, title: paper.title.clone() } }
}

impl Display for HistoryEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{}] {}", self.id, self.title)
  }
}

/// Joins author names with the given separator.
pub(crate) fn join_names(authors: &[Author], separator: &str) -> String {
  authors.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(separator)
}

/// Parses the date formats the backend is known to emit.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` timestamps and bare
/// `YYYY-MM-DD` dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
    return Some(date.with_timezone(&Utc).date_naive());
  }
  if let Ok(date) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(date.date());
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>, {
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
