//! Event reduction and state transition logic.
//!
//! This module implements the reducer at the heart of the feedback form: it
//! takes the current [`ViewState`] and one [`Event`], and returns the next
//! snapshot together with the [`Action`]s the controller must execute.
//!
//! # Architecture
//!
//! ```text
//! UI input ─┐
//!           ├─► Event ─► handle_event(state) ─► (ViewState, Vec<Action>)
//! results ──┘                                         │
//!    ▲                                                ▼
//!    └──── upload worker / submission service ◄── controller
//! ```
//!
//! # Event Types
//!
//! - **Input**: `CategoryChanged`, `TitleChanged`, `MessageChanged`,
//!   `ImagesAppended`, `ImageDeleted`, `Commit`
//! - **Upload**: `Upload` wrapping an [`UploadEvent`]
//! - **Submission**: `SubmissionSucceeded`, `SubmissionFailed`
//!
//! # Commit Cycle
//!
//! `Commit` branches once on whether pending images exist at that moment.
//! Without pending images it submits directly; with them it starts one upload
//! batch and submits when the batch finishes cleanly. Images appended while a
//! batch runs are not added to it. A `Commit` that arrives while an action is
//! already in flight is ignored, so at most one submission is ever running.
//!
//! # Example
//!
//! ```rust
//! use feedback_form::{handle_event, Action, Category, Event, ViewState};
//!
//! let state = ViewState::default();
//! let (state, _) = handle_event(&state, &Event::CategoryChanged(Category::Bug));
//! let (state, _) = handle_event(&state, &Event::TitleChanged("Crash on launch".into()));
//! let (state, actions) = handle_event(&state, &Event::Commit);
//!
//! assert!(state.is_actioning);
//! assert!(matches!(actions.as_slice(), [Action::Submit(_)]));
//! ```

use crate::app::{Action, ViewState};
use crate::domain::{ActionError, Category, ImageData, ImageSource};
use crate::worker::UploadEvent;

/// Inputs to the reducer: user edits and asynchronous results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user picked a category.
    CategoryChanged(Category),
    /// The title field changed.
    TitleChanged(String),
    /// The message field changed.
    MessageChanged(String),
    /// The picker returned images. Anything past the remaining capacity is
    /// dropped.
    ImagesAppended(Vec<ImageData>),
    /// The user removed the attachment with this key.
    ImageDeleted(String),
    /// The user pressed the commit control.
    Commit,

    /// Progress from the running upload batch.
    Upload(UploadEvent),

    /// The submission service accepted the report.
    SubmissionSucceeded,
    /// The submission service failed; carries its error message.
    SubmissionFailed(String),
}

impl From<UploadEvent> for Event {
    fn from(event: UploadEvent) -> Self {
        Self::Upload(event)
    }
}

/// Reduces one event into the next snapshot and the actions to execute.
///
/// Pure and total: unknown keys and out-of-place results are no-ops, and
/// failures are recorded in `action_error` rather than returned.
///
/// # Tracing
///
/// Each call opens a debug span carrying the event.
#[must_use]
pub fn handle_event(state: &ViewState, event: &Event) -> (ViewState, Vec<Action>) {
    let _span = tracing::debug_span!("handle_event", event = ?event).entered();

    match event {
        Event::CategoryChanged(category) => (state.with_category(Some(*category)), vec![]),
        Event::TitleChanged(title) => (state.with_title(title.clone()), vec![]),
        Event::MessageChanged(message) => (state.with_message(message.clone()), vec![]),
        Event::ImagesAppended(images) => {
            let capacity = state.remaining_capacity();
            if images.len() > capacity {
                tracing::debug!(
                    requested = images.len(),
                    capacity = capacity,
                    "dropping images beyond attachment limit"
                );
            }
            let accepted = images.iter().take(capacity).cloned().collect();
            (state.append_pending(accepted), vec![])
        }
        Event::ImageDeleted(key) => (state.delete(key), vec![]),
        Event::Commit => commit(state),
        Event::Upload(UploadEvent::ItemUploaded { descriptor, key }) => {
            if state.index_of(key).is_none() {
                tracing::debug!(key = %key, "uploaded image was deleted, ignoring");
            }
            let uploaded = ImageSource::uploaded(descriptor.url.clone(), key.clone());
            (state.replace(key, uploaded), vec![])
        }
        Event::Upload(UploadEvent::BatchFinished(summary)) => {
            tracing::debug!(
                launched = summary.launched,
                succeeded = summary.succeeded,
                failed = summary.failed,
                skipped = summary.skipped,
                "upload batch finished"
            );
            batch_finished(state)
        }
        Event::SubmissionSucceeded => {
            tracing::info!("feedback submitted");
            let next = ViewState {
                is_actioning: false,
                ..state.clone()
            };
            (next, vec![Action::NotifySubmitted])
        }
        Event::SubmissionFailed(message) => {
            tracing::warn!(error = %message, "feedback submission failed");
            let next = ViewState {
                is_actioning: false,
                action_error: Some(ActionError::Submission(message.clone())),
                ..state.clone()
            };
            (next, vec![])
        }
    }
}

fn commit(state: &ViewState) -> (ViewState, Vec<Action>) {
    if state.is_actioning {
        tracing::debug!("commit ignored, action already in flight");
        return (state.clone(), vec![]);
    }

    let pending: Vec<_> = state
        .images
        .iter()
        .filter_map(ImageSource::to_pending_image)
        .collect();

    if !pending.is_empty() {
        tracing::debug!(pending = pending.len(), "starting image upload before submit");
        let next = ViewState {
            is_actioning: true,
            action_error: None,
            ..state.clone()
        };
        return (next, vec![Action::UploadBatch(pending)]);
    }

    if state.title.is_empty() {
        tracing::debug!("commit ignored, title is empty");
        return (state.clone(), vec![]);
    }

    submit(state)
}

fn batch_finished(state: &ViewState) -> (ViewState, Vec<Action>) {
    let idle = ViewState {
        is_actioning: false,
        ..state.clone()
    };

    let remaining = idle.remaining_pending().len();
    if remaining > 0 {
        tracing::warn!(remaining = remaining, "images failed to upload");
        let next = ViewState {
            action_error: Some(ActionError::UploadFailed { count: remaining }),
            ..idle
        };
        return (next, vec![]);
    }

    if idle.remote_urls().is_empty() {
        tracing::debug!("no uploaded images left after batch, nothing to submit");
        return (idle, vec![]);
    }

    submit(&idle)
}

fn submit(state: &ViewState) -> (ViewState, Vec<Action>) {
    let params = state.submission_params();
    tracing::debug!(
        category = %params.category,
        images = params.images.len(),
        has_message = params.message.is_some(),
        "submitting feedback"
    );
    let next = ViewState {
        is_actioning: true,
        action_error: None,
        ..state.clone()
    };
    (next, vec![Action::Submit(params)])
}
