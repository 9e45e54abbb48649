use super::*;

#[traced_test]
#[tokio::test]
async fn test_paper_page_loads_insights() -> TestResult<()> {
  let (backend, mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;

  let mut session = PaperSession::open(backend, &history, 42).await?;
  let view = session.view();
  assert_eq!(view.paper.author_names(), "Ada, Alan");
  assert_eq!(view.paper.formatted_date(), "01.05.2019");
  assert_eq!(view.ai, AiStatus::Loading);

  let view = session.settle().await;
  assert_eq!(view.ai, AiStatus::Idle);
  assert_eq!(view.insights, Insights {
    summary:  "Summary of Foo".to_string(),
    takeaway: "Takeaway of Foo".to_string(),
    citation: "Citation of Foo".to_string(),
  });

  let requests = mock.state.crew_requests.lock().unwrap().clone();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0]["paper_content"], "We study foo.");
  assert_eq!(requests[0]["authors"], "Ada,Alan");
  assert_eq!(requests[0]["title"], "Foo");
  assert_eq!(requests[0]["journal"], "");
  assert_eq!(requests[0]["year"], "2019");
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_null_fields_and_failed_crew_run() -> TestResult<()> {
  let (backend, mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;

  let mut session = PaperSession::open(backend, &history, 7).await?;
  assert!(session.view().paper.abstract_text.is_empty());
  assert!(session.view().paper.authors.is_empty());

  let view = session.settle().await;
  assert_eq!(view.ai, AiStatus::Error);
  assert_eq!(view.insights, Insights::default());

  let requests = mock.state.crew_requests.lock().unwrap().clone();
  assert_eq!(requests[0]["year"], "");
  assert_eq!(requests[0]["authors"], "");
  Ok(())
}
