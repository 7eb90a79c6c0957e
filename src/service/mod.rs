//! Collaborator services used by the controller.
//!
//! # Modules
//!
//! - `backend`: Service traits the controller depends on
//! - `outbox`: Submission service writing reports to a JSON outbox file
//! - `local`: File service storing uploads in a local directory

pub mod backend;
pub mod local;
pub mod outbox;

pub use backend::{FileService, SubmissionService};
pub use local::DirectoryFileService;
pub use outbox::{OutboxReport, OutboxSubmissionService};
