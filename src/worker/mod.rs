//! Background upload worker.
//!
//! Uploads run on tokio tasks, off the controller's reducer loop. Results are
//! handed back as [`UploadEvent`]s over a channel so the view state is only
//! ever replaced by the controller.
//!
//! # Architecture
//!
//! - `messages`: Events a batch reports back to the controller
//! - `coordinator`: Semaphore-bounded batch uploader with a join barrier

pub mod coordinator;
pub mod messages;

pub use coordinator::{UploadCoordinator, UploadSettings, MAX_CONCURRENT_UPLOADS};
pub use messages::{BatchSummary, UploadEvent};
