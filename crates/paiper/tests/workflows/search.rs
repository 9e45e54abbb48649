use std::time::Duration;

use super::*;

#[traced_test]
#[tokio::test]
async fn test_search_results() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let results = backend.search("foo").await?;

  assert_eq!(results.len(), 2);
  assert_eq!(results[0].id, Some(42));
  assert_eq!(results[0].author_names(), "Ada, Alan");
  assert_eq!(results[1].id, None);
  assert!(results[1].authors.is_empty());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_not_found_differs_from_error() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let debounce = Duration::from_millis(20);

  let mut search = SearchController::spawn(backend.clone(), debounce);
  search.input("nothing");
  assert_eq!(search.settled().await, SearchState::NotFound { query: "nothing".to_string() });

  search.input("explode");
  match search.settled().await {
    SearchState::Error { query, message } => {
      assert_eq!(query, "explode");
      assert!(message.contains("500"));
    },
    other => panic!("expected an error state, got {other:?}"),
  }
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_error_body_on_success_status() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;

  let result = backend.search("offline").await;
  assert!(matches!(result, Err(PaiperError::Backend(ref message)) if message == "search index offline"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_controller_against_backend() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let mut search = SearchController::spawn(backend, Duration::from_millis(20));

  for prefix in ["f", "fo", "foo"] {
    search.input(prefix);
  }
  match search.settled().await {
    SearchState::Results { query, results } => {
      assert_eq!(query, "foo");
      assert_eq!(results[0].title, "Foo");
    },
    other => panic!("expected results, got {other:?}"),
  }
  Ok(())
}
