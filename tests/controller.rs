use feedback_form::{
    initialize, ActionError, Category, Config, FeedbackController, FeedbackError, FeedbackHandle,
    FeedbackParams, FileDescriptor, FileService, ImageData, OutboxSubmissionService, Result,
    SubmissionService, UploadContext, UploadSettings, ViewState,
};
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const WAIT: Duration = Duration::from_secs(5);

/// Uploads succeed unless the payload starts with `fail`.
#[derive(Default)]
struct FakeFiles {
    uploads: AtomicUsize,
}

impl FileService for FakeFiles {
    fn upload(
        &self,
        image: ImageData,
        _context: UploadContext,
        name: String,
    ) -> BoxFuture<'_, Result<FileDescriptor>> {
        Box::pin(async move {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if image.as_bytes().starts_with(b"fail") {
                return Err(FeedbackError::Upload("storage unavailable".to_string()));
            }
            Ok(FileDescriptor {
                url: format!("https://files.test/{name}"),
                original_name: name,
            })
        })
    }
}

#[derive(Default)]
struct FakeSubmission {
    reject: AtomicBool,
    submitted: Mutex<Vec<FeedbackParams>>,
}

impl FakeSubmission {
    fn calls(&self) -> Vec<FeedbackParams> {
        self.submitted.lock().unwrap().clone()
    }
}

impl SubmissionService for FakeSubmission {
    fn submit(&self, params: FeedbackParams) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.submitted.lock().unwrap().push(params);
            if self.reject.load(Ordering::SeqCst) {
                return Err(FeedbackError::Submission("server said no".to_string()));
            }
            Ok(())
        })
    }
}

struct PanickingSubmission;

impl SubmissionService for PanickingSubmission {
    fn submit(&self, _params: FeedbackParams) -> BoxFuture<'_, Result<()>> {
        panic!("backend exploded");
    }
}

struct Harness {
    handle: FeedbackHandle,
    task: JoinHandle<()>,
    files: Arc<FakeFiles>,
    submission: Arc<FakeSubmission>,
}

fn start() -> Harness {
    let files = Arc::new(FakeFiles::default());
    let submission = Arc::new(FakeSubmission::default());
    let (controller, handle) =
        FeedbackController::new(files.clone(), submission.clone(), UploadSettings::default());
    Harness {
        handle,
        task: controller.spawn(),
        files,
        submission,
    }
}

async fn wait_until(
    rx: &mut watch::Receiver<ViewState>,
    predicate: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("controller stopped")
        .clone()
}

async fn shutdown(handle: FeedbackHandle, task: JoinHandle<()>) {
    drop(handle);
    tokio::time::timeout(WAIT, task)
        .await
        .expect("controller did not stop")
        .unwrap();
}

fn image(bytes: &[u8]) -> ImageData {
    ImageData::new(bytes.to_vec())
}

#[tokio::test]
async fn commit_without_images_submits_directly() {
    let Harness {
        handle,
        task,
        files,
        submission,
    } = start();
    let mut submitted = handle.submitted();

    handle.category_update(Category::Bug).unwrap();
    handle.title_update("Crash on launch").unwrap();
    handle.message_update("Happens every time").unwrap();
    handle.commit().unwrap();

    tokio::time::timeout(WAIT, submitted.recv())
        .await
        .unwrap()
        .unwrap();

    let calls = submission.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].category, Category::Bug);
    assert_eq!(calls[0].title, "Crash on launch");
    assert_eq!(calls[0].message.as_deref(), Some("Happens every time"));
    assert!(calls[0].images.is_empty());
    assert_eq!(files.uploads.load(Ordering::SeqCst), 0);

    let mut rx = handle.view_state();
    let state = wait_until(&mut rx, |s| !s.is_actioning).await;
    assert!(state.action_error.is_none());

    shutdown(handle, task).await;
}

#[tokio::test]
async fn commit_with_images_uploads_then_submits_urls() {
    let Harness {
        handle,
        task,
        files,
        submission,
    } = start();
    let mut submitted = handle.submitted();

    handle.category_update(Category::Feature).unwrap();
    handle.title_update("Dark mode").unwrap();
    handle
        .append(vec![image(b"one"), image(b"two"), image(b"three")])
        .unwrap();
    handle.commit().unwrap();

    tokio::time::timeout(WAIT, submitted.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(files.uploads.load(Ordering::SeqCst), 3);

    let state = handle.value();
    assert_eq!(state.images.len(), 3);
    assert!(state.images.iter().all(|i| !i.is_pending()));

    let calls = submission.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].images, state.remote_urls());
    assert_eq!(calls[0].message, None);

    shutdown(handle, task).await;
}

#[tokio::test]
async fn failed_upload_blocks_submission_until_retry() {
    let Harness {
        handle,
        task,
        files: _,
        submission,
    } = start();
    let mut rx = handle.view_state();

    handle.category_update(Category::Bug).unwrap();
    handle.title_update("Broken screenshot").unwrap();
    handle.append(vec![image(b"ok"), image(b"fail")]).unwrap();
    handle.commit().unwrap();

    let state = wait_until(&mut rx, |s| s.action_error.is_some()).await;
    assert!(!state.is_actioning);
    assert_eq!(state.action_error, Some(ActionError::UploadFailed { count: 1 }));
    assert_eq!(
        state.action_error.as_ref().unwrap().to_string(),
        "1 image(s) failed to upload"
    );
    assert_eq!(state.remaining_pending().len(), 1);
    assert!(submission.calls().is_empty());

    // Drop the bad image and retry with what was already uploaded.
    let failed_key = state.remaining_pending()[0].key().to_string();
    let mut submitted = handle.submitted();
    handle.delete(failed_key).unwrap();
    handle.commit().unwrap();

    tokio::time::timeout(WAIT, submitted.recv())
        .await
        .unwrap()
        .unwrap();

    let calls = submission.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].images.len(), 1);

    let state = handle.value();
    assert!(state.action_error.is_none());

    shutdown(handle, task).await;
}

#[tokio::test]
async fn rejected_submission_shows_service_message() {
    let harness = start();
    harness.submission.reject.store(true, Ordering::SeqCst);
    let handle = harness.handle;
    let mut rx = handle.view_state();
    let mut submitted = handle.submitted();

    handle.title_update("Slow sync").unwrap();
    handle.commit().unwrap();

    let state = wait_until(&mut rx, |s| s.action_error.is_some()).await;
    assert!(!state.is_actioning);
    assert_eq!(
        state.action_error.unwrap().to_string(),
        "Submission error: server said no"
    );
    assert!(submitted.try_recv().is_err());

    shutdown(handle, harness.task).await;
}

#[tokio::test]
async fn panicking_submission_clears_busy_state() {
    let files = Arc::new(FakeFiles::default());
    let (controller, handle) = FeedbackController::new(
        files,
        Arc::new(PanickingSubmission),
        UploadSettings::default(),
    );
    let task = controller.spawn();
    let mut rx = handle.view_state();
    let mut submitted = handle.submitted();

    handle.category_update(Category::Bug).unwrap();
    handle.title_update("Crash on launch").unwrap();
    handle.commit().unwrap();

    let state = wait_until(&mut rx, |s| s.action_error.is_some()).await;
    assert!(!state.is_actioning);
    let message = state.action_error.unwrap().to_string();
    assert!(message.contains("backend exploded"), "{message}");
    assert!(submitted.try_recv().is_err());

    shutdown(handle, task).await;
}

#[tokio::test]
async fn second_commit_while_busy_is_ignored() {
    let Harness {
        handle,
        task,
        files: _,
        submission,
    } = start();
    let mut submitted = handle.submitted();

    handle.title_update("Double tap").unwrap();
    handle.commit().unwrap();
    handle.commit().unwrap();

    tokio::time::timeout(WAIT, submitted.recv())
        .await
        .unwrap()
        .unwrap();
    shutdown(handle, task).await;

    assert_eq!(submission.calls().len(), 1);
}

#[tokio::test]
async fn queued_commit_completes_after_handle_is_dropped() {
    let Harness {
        handle,
        task,
        files,
        submission,
    } = start();
    let mut rx = handle.view_state();

    handle.title_update("Fire and forget").unwrap();
    handle.append(vec![image(b"png")]).unwrap();
    handle.commit().unwrap();
    shutdown(handle, task).await;

    assert_eq!(files.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(submission.calls().len(), 1);

    let last = rx.borrow_and_update().clone();
    assert!(!last.is_actioning);
    assert!(last.images.iter().all(|i| !i.is_pending()));
}

#[tokio::test]
async fn commit_without_title_does_nothing() {
    let Harness {
        handle,
        task,
        files: _,
        submission,
    } = start();

    handle.category_update(Category::Other).unwrap();
    handle.commit().unwrap();
    assert!(!handle.commitable());
    shutdown(handle, task).await;

    assert!(submission.calls().is_empty());
}

#[tokio::test]
async fn local_services_write_outbox_and_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        outbox_path: Some(dir.path().join("outbox.json")),
        upload_dir: Some(dir.path().join("uploads")),
        ..Config::default()
    };

    let (controller, handle) = initialize(&config).unwrap();
    let task = controller.spawn();
    let mut submitted = handle.submitted();

    handle.category_update(Category::Performance).unwrap();
    handle.title_update("Laggy scrolling").unwrap();
    handle.append(vec![image(b"\x89PNG"), image(b"GIF89a")]).unwrap();
    handle.commit().unwrap();

    tokio::time::timeout(WAIT, submitted.recv())
        .await
        .unwrap()
        .unwrap();
    shutdown(handle, task).await;

    let outbox = OutboxSubmissionService::new(config.resolved_outbox_path()).unwrap();
    let reports = outbox.pending_reports().await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].params.category, Category::Performance);
    assert_eq!(reports[0].params.images.len(), 2);
    assert!(reports[0]
        .params
        .images
        .iter()
        .all(|url| url.starts_with("file://")));

    let uploaded = std::fs::read_dir(dir.path().join("uploads").join("feedback"))
        .unwrap()
        .count();
    assert_eq!(uploaded, 2);
}
