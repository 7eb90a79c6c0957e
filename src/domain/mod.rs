//! Domain layer for the feedback form.
//!
//! Plain value types shared by the state machine, the upload worker and the
//! collaborator services. Nothing here performs I/O.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`image`]: Attachments and their upload lifecycle
//! - [`report`]: Categories and the submission payload

pub mod error;
pub mod image;
pub mod report;

pub use error::{ActionError, FeedbackError, Result};
pub use image::{FileDescriptor, ImageData, ImageSource, PendingImage};
pub use report::{Category, FeedbackParams, UploadContext};
