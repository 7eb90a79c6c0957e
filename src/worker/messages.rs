//! Messages reported by an upload batch back to the controller.
//!
//! Upload tasks never touch the view state. They report through these events,
//! which the controller feeds into its sequential reducer.

use crate::domain::FileDescriptor;

/// Progress of one upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// One image uploaded. Sent as soon as that upload resolves.
    ItemUploaded {
        /// Descriptor returned by the file service.
        descriptor: FileDescriptor,

        /// Key of the pending entry the upload was started for.
        key: String,
    },

    /// Every launched upload has resolved. Sent exactly once per batch, after
    /// all `ItemUploaded` events of that batch.
    BatchFinished(BatchSummary),
}

/// Outcome counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Uploads actually started.
    pub launched: usize,

    /// Uploads that returned a descriptor.
    pub succeeded: usize,

    /// Uploads that failed or whose task panicked.
    pub failed: usize,

    /// Entries skipped for lacking a payload or key.
    pub skipped: usize,
}

impl BatchSummary {
    /// Whether every launched upload has been accounted for.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.succeeded + self.failed == self.launched
    }
}
