//! JSON outbox submission service.
//!
//! Reports are appended to a human-readable JSON file instead of being sent
//! over the network. Writes are atomic (write-to-temp + rename) so a crash
//! never leaves a half-written outbox behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "reports": [
//!     {
//!       "submitted_at": "2026-10-19T08:30:00Z",
//!       "category": "bug",
//!       "title": "Crash on launch",
//!       "images": []
//!     }
//!   ]
//! }
//! ```

use crate::domain::error::{FeedbackError, Result};
use crate::domain::FeedbackParams;
use crate::service::backend::SubmissionService;
use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Outbox container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OutboxData {
    /// Version of the outbox format for future migrations.
    version: u32,

    #[serde(default)]
    reports: Vec<OutboxReport>,
}

impl Default for OutboxData {
    fn default() -> Self {
        Self {
            version: 1,
            reports: Vec::new(),
        }
    }
}

/// A submitted report with the time it was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxReport {
    pub submitted_at: DateTime<Utc>,

    #[serde(flatten)]
    pub params: FeedbackParams,
}

/// Submission service backed by a local JSON file.
///
/// The file is re-read on every submission so several processes (or a
/// separate sender draining the outbox) can share it. Submissions from one
/// instance are serialized through an async mutex.
#[derive(Debug)]
pub struct OutboxSubmissionService {
    file_path: PathBuf,
    lock: Mutex<()>,
}

impl OutboxSubmissionService {
    /// Creates a service writing to `file_path`.
    ///
    /// Parent directories are created immediately; the file itself on the
    /// first submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        tracing::debug!(path = ?file_path, "initializing report outbox");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self {
            file_path,
            lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// All reports currently in the outbox, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn pending_reports(&self) -> Result<Vec<OutboxReport>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.reports)
    }

    async fn load(&self) -> Result<OutboxData> {
        if !tokio::fs::try_exists(&self.file_path).await? {
            return Ok(OutboxData::default());
        }

        let contents = tokio::fs::read_to_string(&self.file_path).await?;
        serde_json::from_str(&contents)
            .map_err(|e| FeedbackError::Outbox(format!("failed to parse JSON: {e}")))
    }

    async fn save(&self, data: &OutboxData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| FeedbackError::Outbox(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.file_path).await?;
        Ok(())
    }
}

impl SubmissionService for OutboxSubmissionService {
    fn submit(&self, params: FeedbackParams) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let _guard = self.lock.lock().await;

            let mut data = self.load().await?;
            data.reports.push(OutboxReport {
                submitted_at: Utc::now(),
                params,
            });
            self.save(&data).await?;

            tracing::debug!(
                path = ?self.file_path,
                queued = data.reports.len(),
                "report written to outbox"
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;

    #[tokio::test]
    async fn submissions_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxSubmissionService::new(dir.path().join("nested/outbox.json")).unwrap();

        let first = FeedbackParams::new(Some(Category::Bug), "Crash", "", vec![]);
        let second = FeedbackParams::new(None, "Slow", "10s", vec!["file:///a".into()]);
        outbox.submit(first.clone()).await.unwrap();
        outbox.submit(second.clone()).await.unwrap();

        let reports = outbox.pending_reports().await.unwrap();
        let params: Vec<_> = reports.into_iter().map(|r| r.params).collect();
        assert_eq!(params, vec![first, second]);
        assert!(!outbox.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn missing_outbox_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = OutboxSubmissionService::new(dir.path().join("outbox.json")).unwrap();
        assert!(outbox.pending_reports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_outbox_fails_submission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outbox.json");
        std::fs::write(&path, "{ not json").unwrap();

        let outbox = OutboxSubmissionService::new(&path).unwrap();
        let result = outbox
            .submit(FeedbackParams::new(None, "Crash", "", vec![]))
            .await;
        assert!(matches!(result, Err(FeedbackError::Outbox(_))));
    }
}
