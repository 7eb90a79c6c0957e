//! Side effects requested by the reducer.
//!
//! The reducer never performs I/O. It returns [`Action`]s alongside the next
//! snapshot and the controller executes them in order: spawning upload
//! batches, calling the submission service, and notifying subscribers.
//!
//! # Example
//!
//! ```rust
//! use feedback_form::{Action, Category, FeedbackParams};
//!
//! let actions = vec![Action::Submit(FeedbackParams::new(
//!     Some(Category::Bug),
//!     "Crash on launch",
//!     "",
//!     vec![],
//! ))];
//! assert_eq!(actions.len(), 1);
//! ```

use crate::domain::{FeedbackParams, PendingImage};

/// Commands produced by [`crate::app::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Uploads a fixed batch of pending images.
    ///
    /// Results come back as `Event::Upload`; the batch always ends with a
    /// single `BatchFinished`.
    UploadBatch(Vec<PendingImage>),

    /// Calls the submission service once with these parameters.
    ///
    /// The outcome comes back as `SubmissionSucceeded` or `SubmissionFailed`.
    Submit(FeedbackParams),

    /// Emits the "submitted" signal to subscribers.
    NotifySubmitted,
}
