//! Bounded-concurrency upload of a pending image batch.
//!
//! The coordinator runs one batch at a time: it acquires a semaphore permit
//! before launching each upload, reports every success as soon as it lands,
//! and sends a single [`UploadEvent::BatchFinished`] once every launched
//! upload has resolved.
//!
//! ```text
//! pending ─► acquire permit ─► spawn upload ─► ItemUploaded (success only)
//!                 ▲                 │
//!                 └── release ◄─────┘
//!                                   ▼
//!                        join all ─► BatchFinished
//! ```

use crate::domain::{PendingImage, UploadContext};
use crate::service::FileService;
use crate::worker::{BatchSummary, UploadEvent};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

/// Hard ceiling on uploads in flight, whatever the batch size.
pub const MAX_CONCURRENT_UPLOADS: usize = 6;

/// Tunables for an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Namespace passed to every upload call.
    pub context: UploadContext,

    /// Upper bound on uploads in flight, clamped to
    /// `1..=MAX_CONCURRENT_UPLOADS`.
    pub max_concurrency: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            context: UploadContext::default(),
            max_concurrency: MAX_CONCURRENT_UPLOADS,
        }
    }
}

impl UploadSettings {
    /// Permits for a batch of `batch_size` images.
    #[must_use]
    pub fn permits_for(&self, batch_size: usize) -> usize {
        batch_size.min(self.max_concurrency.clamp(1, MAX_CONCURRENT_UPLOADS))
    }
}

/// Uploads pending images through a [`FileService`].
#[derive(Clone)]
pub struct UploadCoordinator {
    files: Arc<dyn FileService>,
    settings: UploadSettings,
}

impl std::fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl UploadCoordinator {
    #[must_use]
    pub fn new(files: Arc<dyn FileService>, settings: UploadSettings) -> Self {
        Self { files, settings }
    }

    /// Uploads `batch` and reports progress on `events`.
    ///
    /// Entries without a payload or key are skipped. Failed uploads are
    /// counted but produce no event and are not retried. Returns the same
    /// summary that was sent in `BatchFinished`.
    ///
    /// A closed `events` channel does not stop the batch; remaining uploads
    /// still run to completion.
    pub async fn run<E>(
        &self,
        batch: Vec<PendingImage>,
        events: mpsc::UnboundedSender<E>,
    ) -> BatchSummary
    where
        E: From<UploadEvent> + Send + 'static,
    {
        let (uploadable, skipped): (Vec<_>, Vec<_>) =
            batch.into_iter().partition(PendingImage::is_uploadable);

        let permits = self.settings.permits_for(uploadable.len());
        let span = tracing::debug_span!(
            "upload_batch",
            size = uploadable.len(),
            skipped = skipped.len(),
            permits = permits
        );

        let mut summary = BatchSummary {
            skipped: skipped.len(),
            ..BatchSummary::default()
        };

        async {
            let semaphore = Arc::new(Semaphore::new(permits));
            let mut tasks = JoinSet::new();

            for pending in uploadable {
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    tracing::error!("upload semaphore closed unexpectedly");
                    break;
                };

                let files = Arc::clone(&self.files);
                let context = self.settings.context.clone();
                let events = events.clone();
                summary.launched += 1;

                tasks.spawn(
                    async move {
                        let _permit = permit;
                        let PendingImage { image, key } = pending;

                        match files.upload(image, context, key.clone()).await {
                            Ok(descriptor) => {
                                tracing::debug!(key = %key, url = %descriptor.url, "image uploaded");
                                let _ = events.send(UploadEvent::ItemUploaded { descriptor, key }.into());
                                true
                            }
                            Err(e) => {
                                tracing::debug!(key = %key, error = %e, "image upload failed");
                                false
                            }
                        }
                    }
                    .in_current_span(),
                );
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(true) => summary.succeeded += 1,
                    Ok(false) => summary.failed += 1,
                    Err(e) => {
                        tracing::error!(error = %e, "upload task aborted");
                        summary.failed += 1;
                    }
                }
            }
        }
        .instrument(span)
        .await;

        debug_assert!(summary.is_settled());
        let _ = events.send(UploadEvent::BatchFinished(summary).into());
        summary
    }
}
