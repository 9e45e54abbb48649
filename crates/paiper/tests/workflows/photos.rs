use std::fs;

use super::*;

#[traced_test]
#[tokio::test]
async fn test_photos_are_listed_on_mount() -> TestResult<()> {
  let (backend, mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;
  mock.seed_photos(42, &["/uploads/42/a.jpg", "/uploads/42/b.jpg"]);

  let mut session = PaperSession::open(backend, &history, 42).await?;
  let view = session.settle().await;
  assert_eq!(view.photos, vec!["/uploads/42/a.jpg", "/uploads/42/b.jpg"]);
  assert_eq!(view.visible_photo(), Some("/uploads/42/b.jpg"));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_upload_then_delete_photo() -> TestResult<()> {
  let (backend, mock) = create_test_backend().await;
  let (history, dir) = create_test_history().await;
  mock.seed_photos(42, &["/uploads/42/old.jpg"]);

  let mut session = PaperSession::open(backend.clone(), &history, 42).await?;
  session.settle().await;

  let image = dir.path().join("note.jpg");
  fs::write(&image, [0xFF, 0xD8, 0xFF, 0xE0])?;
  session.upload_photo_file(&image).await?;

  // The page only keeps the new photo, the backend keeps both
  let uploaded = session.view().photos.clone();
  assert_eq!(uploaded.len(), 1);
  assert!(uploaded[0].starts_with(backend.base_url().as_str().trim_end_matches('/')));
  assert!(uploaded[0].contains("/uploads/42/photo_"));
  assert_eq!(mock.stored_photos(42).len(), 2);

  let (field, file_name, size) = mock.state.uploads.lock().unwrap()[0].clone();
  assert_eq!(field, "photo");
  assert!(file_name.starts_with("photo_") && file_name.ends_with(".jpg"));
  assert_eq!(size, 4);

  let pending = session.request_delete().unwrap();
  assert_eq!(pending.photo(), uploaded[0]);
  pending.confirm().await?;

  assert!(session.view().photos.is_empty());
  assert_eq!(mock.stored_photos(42), vec!["/uploads/42/old.jpg"]);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_failed_delete_keeps_photo() -> TestResult<()> {
  let (backend, mock) = create_test_backend().await;
  let (history, _dir) = create_test_history().await;
  mock.seed_photos(42, &["/uploads/42/a.jpg"]);

  let mut session = PaperSession::open(backend, &history, 42).await?;
  session.settle().await;
  mock.seed_photos(42, &[]);

  let result = session.request_delete().unwrap().confirm().await;
  assert!(matches!(result, Err(PaiperError::Status { status: 404, .. })));
  assert_eq!(session.view().photos, vec!["/uploads/42/a.jpg"]);
  assert!(session.view().notice.is_some());
  Ok(())
}
