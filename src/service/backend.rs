//! Collaborator service abstractions.
//!
//! The controller depends on two external services: one that accepts the
//! finished report and one that stores a single image. Both are traits so
//! that transports can be swapped without touching the state machine, and so
//! tests can substitute in-memory fakes.
//!
//! Methods return boxed futures; implementations are shared behind `Arc` and
//! called concurrently from upload tasks.

use crate::domain::error::Result;
use crate::domain::{FeedbackParams, FileDescriptor, ImageData, UploadContext};
use futures_util::future::BoxFuture;

/// Accepts finished feedback reports.
///
/// # Implementations
///
/// - [`crate::service::OutboxSubmissionService`]: appends reports to a local JSON outbox
///
/// # Examples
///
/// ```
/// use feedback_form::{FeedbackParams, Result, SubmissionService};
/// use futures_util::future::BoxFuture;
///
/// struct Discard;
///
/// impl SubmissionService for Discard {
///     fn submit(&self, _params: FeedbackParams) -> BoxFuture<'_, Result<()>> {
///         Box::pin(async { Ok(()) })
///     }
/// }
/// ```
pub trait SubmissionService: Send + Sync {
    /// Delivers one report.
    ///
    /// # Errors
    ///
    /// Returns an error if the report could not be delivered. The controller
    /// shows the error's message to the user verbatim.
    fn submit(&self, params: FeedbackParams) -> BoxFuture<'_, Result<()>>;
}

/// Stores a single image and returns where it can be fetched from.
///
/// # Implementations
///
/// - [`crate::service::DirectoryFileService`]: writes into a local directory
pub trait FileService: Send + Sync {
    /// Uploads `image` under `name` within `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails. Upload errors are counted by
    /// the coordinator and never retried.
    fn upload(
        &self,
        image: ImageData,
        context: UploadContext,
        name: String,
    ) -> BoxFuture<'_, Result<FileDescriptor>>;
}
