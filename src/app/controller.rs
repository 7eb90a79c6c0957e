//! Feedback controller: the event loop that owns the view state.
//!
//! The controller drains a single channel of [`Event`]s, reduces each one with
//! [`handle_event`], publishes the resulting snapshot, and executes the
//! returned actions. Uploads and submissions run on their own tokio tasks and
//! report back through the same channel, so every state change happens on
//! the loop, in arrival order.
//!
//! ```text
//!  FeedbackHandle ──Event──►┐
//!                           ├─► mpsc ─► FeedbackController::run
//!  upload / submit tasks ──►┘                │
//!                                            ├─► watch<ViewState>   (snapshots)
//!                                            └─► broadcast<()>      (submitted)
//! ```
//!
//! # Lifecycle
//!
//! The loop ends once every [`FeedbackHandle`] has been dropped, every queued
//! event has been reduced, and no commit cycle is in flight. Upload and
//! submission tasks only exist while `is_actioning` is set, so the last
//! result of a cycle is always reduced before the loop exits. The final
//! snapshot stays readable from any outstanding `watch` receiver.
//!
//! # Example
//!
//! ```rust,no_run
//! use feedback_form::{Category, Config, DirectoryFileService, FeedbackController, OutboxSubmissionService};
//! use std::sync::Arc;
//!
//! # async fn demo() -> feedback_form::Result<()> {
//! let config = Config::default();
//! let (controller, handle) = FeedbackController::new(
//!     Arc::new(DirectoryFileService::new("/tmp/feedback-uploads")),
//!     Arc::new(OutboxSubmissionService::new("/tmp/feedback-outbox.json")?),
//!     config.upload_settings(),
//! );
//! let task = controller.spawn();
//!
//! let mut submitted = handle.submitted();
//! handle.category_update(Category::Bug)?;
//! handle.title_update("Crash on launch")?;
//! handle.commit()?;
//! submitted.recv().await.ok();
//!
//! drop(handle);
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

use crate::app::handler::{handle_event, Event};
use crate::app::{Action, ViewState};
use crate::domain::error::{FeedbackError, Result};
use crate::domain::{Category, ImageData};
use crate::service::{FileService, SubmissionService};
use crate::worker::{UploadCoordinator, UploadSettings};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Buffered "submitted" signals per subscriber.
const SUBMITTED_CAPACITY: usize = 16;

/// Owns the current [`ViewState`] and runs the reducer loop.
pub struct FeedbackController {
    state: ViewState,
    events: mpsc::UnboundedReceiver<Event>,
    sender: mpsc::UnboundedSender<Event>,
    handles_closed: mpsc::Receiver<()>,
    uploads: UploadCoordinator,
    submission: Arc<dyn SubmissionService>,
    state_tx: watch::Sender<ViewState>,
    submitted_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for FeedbackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackController")
            .field("state", &self.state)
            .field("uploads", &self.uploads)
            .finish_non_exhaustive()
    }
}

impl FeedbackController {
    /// Creates a controller with a default, empty form and a handle to drive it.
    #[must_use]
    pub fn new(
        files: Arc<dyn FileService>,
        submission: Arc<dyn SubmissionService>,
        settings: UploadSettings,
    ) -> (Self, FeedbackHandle) {
        let state = ViewState::default();
        let (sender, events) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(state.clone());
        let (submitted_tx, _) = broadcast::channel(SUBMITTED_CAPACITY);
        let (alive, handles_closed) = mpsc::channel(1);

        let controller = Self {
            state,
            events,
            sender: sender.clone(),
            handles_closed,
            uploads: UploadCoordinator::new(files, settings),
            submission,
            state_tx,
            submitted_tx: submitted_tx.clone(),
        };
        let handle = FeedbackHandle {
            sender,
            _alive: alive,
            state_rx,
            submitted_tx,
        };
        (controller, handle)
    }

    /// Runs the loop on a new tokio task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Processes events until every handle is gone and the form is idle.
    pub async fn run(mut self) {
        tracing::debug!("feedback controller started");
        let mut handles_open = true;

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.dispatch(&event),
                _ = self.handles_closed.recv(), if handles_open => {
                    tracing::debug!("all handles dropped, draining");
                    handles_open = false;
                }
                else => break,
            }

            if !handles_open && !self.state.is_actioning && self.events.is_empty() {
                break;
            }
        }
        tracing::debug!("feedback controller stopped");
    }

    /// Reduces one event, publishes the snapshot and executes the actions.
    fn dispatch(&mut self, event: &Event) {
        let (next, actions) = handle_event(&self.state, event);
        self.state = next;
        self.state_tx.send_replace(self.state.clone());

        for action in actions {
            self.execute(action);
        }
    }

    fn execute(&self, action: Action) {
        match action {
            Action::NotifySubmitted => {
                let receivers = self.submitted_tx.send(()).unwrap_or(0);
                tracing::debug!(receivers = receivers, "submitted signal sent");
            }
            Action::UploadBatch(batch) => {
                let sender = self.sender.clone();
                let uploads = self.uploads.clone();
                tokio::spawn(async move {
                    uploads.run(batch, sender).await;
                });
            }
            Action::Submit(params) => {
                let sender = self.sender.clone();
                let submission = Arc::clone(&self.submission);
                let span = tracing::debug_span!("submit", title = %params.title);
                tokio::spawn(
                    async move {
                        let outcome = AssertUnwindSafe(async { submission.submit(params).await })
                            .catch_unwind()
                            .await;
                        let event = match outcome {
                            Ok(Ok(())) => Event::SubmissionSucceeded,
                            Ok(Err(e)) => Event::SubmissionFailed(e.to_string()),
                            Err(panic) => {
                                let message = panic_message(panic.as_ref());
                                tracing::error!(panic = %message, "submission task panicked");
                                Event::SubmissionFailed(format!("Submission panicked: {message}"))
                            }
                        };
                        let _ = sender.send(event);
                    }
                    .instrument(span),
                );
            }
        }
    }
}

fn panic_message<'a>(payload: &'a (dyn Any + Send + 'static)) -> &'a str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Input and output side of a running [`FeedbackController`].
///
/// Cheap to clone. Input methods fail with
/// [`FeedbackError::ControllerClosed`] once the loop has stopped.
#[derive(Debug, Clone)]
pub struct FeedbackHandle {
    sender: mpsc::UnboundedSender<Event>,
    /// Never sent on; the controller watches for every clone being dropped.
    _alive: mpsc::Sender<()>,
    state_rx: watch::Receiver<ViewState>,
    submitted_tx: broadcast::Sender<()>,
}

impl FeedbackHandle {
    /// Queues an event for the controller.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn send(&self, event: Event) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| FeedbackError::ControllerClosed)
    }

    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn category_update(&self, category: Category) -> Result<()> {
        self.send(Event::CategoryChanged(category))
    }

    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn title_update(&self, title: impl Into<String>) -> Result<()> {
        self.send(Event::TitleChanged(title.into()))
    }

    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn message_update(&self, message: impl Into<String>) -> Result<()> {
        self.send(Event::MessageChanged(message.into()))
    }

    /// Adds picked images; anything beyond the attachment limit is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn append(&self, images: Vec<ImageData>) -> Result<()> {
        self.send(Event::ImagesAppended(images))
    }

    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn delete(&self, key: impl Into<String>) -> Result<()> {
        self.send(Event::ImageDeleted(key.into()))
    }

    /// Starts a commit cycle. Ignored while one is already running.
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::ControllerClosed`] if the loop has stopped.
    pub fn commit(&self) -> Result<()> {
        self.send(Event::Commit)
    }

    /// Stream of snapshots. Intermediate snapshots may be coalesced.
    #[must_use]
    pub fn view_state(&self) -> watch::Receiver<ViewState> {
        self.state_rx.clone()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn value(&self) -> ViewState {
        self.state_rx.borrow().clone()
    }

    #[must_use]
    pub fn commitable(&self) -> bool {
        self.state_rx.borrow().commitable
    }

    /// Subscribes to the "submitted" signal. Only signals sent after
    /// subscribing are received.
    #[must_use]
    pub fn submitted(&self) -> broadcast::Receiver<()> {
        self.submitted_tx.subscribe()
    }
}
