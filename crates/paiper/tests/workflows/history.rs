use super::*;

#[traced_test]
#[tokio::test]
async fn test_opening_paper_records_history_once() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;

  assert!(HomeView::load(&history).await?.is_empty());

  PaperSession::open(backend.clone(), &history, 42).await?.settle().await;
  let home = HomeView::load(&history).await?;
  assert_eq!(home.entries, vec![HistoryEntry { id: 42, title: "Foo".to_string() }]);

  PaperSession::open(backend, &history, 42).await?.settle().await;
  assert_eq!(HomeView::load(&history).await?.entries.len(), 1);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_missing_paper_is_not_recorded() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;

  let result = PaperSession::open(backend, &history, 404).await;
  assert!(matches!(result, Err(PaiperError::Status { status: 404, .. })));
  assert!(history.load().await?.is_empty());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_history_survives_reopen() -> TestResult<()> {
  let (backend, _mock) = create_test_backend().await;
  let dir = tempdir()?;
  let path = dir.path().join("paiper.db");

  {
    let history = HistoryStore::open(&path).await?;
    PaperSession::open(backend.clone(), &history, 42).await?.settle().await;
    PaperSession::open(backend, &history, 7).await?.settle().await;
  }

  let history = HistoryStore::open(&path).await?;
  let titles: Vec<_> = history.load().await?.into_iter().map(|entry| entry.title).collect();
  assert_eq!(titles, vec!["Foo", "Broken"]);
  Ok(())
}
