//! Error types for the feedback form.
//!
//! This module defines the crate-wide error type [`FeedbackError`] with its
//! [`Result`] alias, and the view-facing [`ActionError`] that is attached to
//! view state snapshots. Both are implemented with the `thiserror` crate.

use thiserror::Error;

/// The main error type for feedback form operations.
///
/// Returned by the collaborator services, configuration loading and the local
/// service implementations. Failures reported by the services never escape the
/// controller as `Err`; they are folded into an [`ActionError`] on the next
/// snapshot instead.
///
/// # Examples
///
/// ```
/// use feedback_form::FeedbackError;
///
/// fn validate() -> Result<(), FeedbackError> {
///     Err(FeedbackError::Config("upload_context must not be empty".to_string()))
/// }
/// assert!(validate().is_err());
/// ```
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single file upload failed.
    #[error("Upload error: {0}")]
    Upload(String),

    /// The submission service rejected or failed to deliver a report.
    #[error("Submission error: {0}")]
    Submission(String),

    /// Reading or writing the local report outbox failed.
    #[error("Outbox error: {0}")]
    Outbox(String),

    /// A category name did not match any known category.
    #[error("Unknown feedback category: {0}")]
    UnknownCategory(String),

    /// The controller event loop is no longer running.
    #[error("Feedback controller is closed")]
    ControllerClosed,
}

/// A specialized `Result` type for feedback form operations.
pub type Result<T> = std::result::Result<T, FeedbackError>;

/// User-visible failure of a commit cycle.
///
/// Stored in `ViewState::action_error`. Cloneable and comparable so that
/// snapshots stay plain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Some images were still pending after the upload batch finished.
    #[error("{count} image(s) failed to upload")]
    UploadFailed {
        /// Number of images left in the pending state.
        count: usize,
    },

    /// The submission service failed; carries its message verbatim.
    #[error("{0}")]
    Submission(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_message_carries_count() {
        let error = ActionError::UploadFailed { count: 1 };
        assert_eq!(error.to_string(), "1 image(s) failed to upload");
    }

    #[test]
    fn submission_failure_is_verbatim() {
        let source = FeedbackError::Submission("server said no".to_string());
        let error = ActionError::Submission(source.to_string());
        assert_eq!(error.to_string(), "Submission error: server said no");
    }
}
