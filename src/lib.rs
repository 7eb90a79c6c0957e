//! Feedback form: view-state machine and bounded-concurrency image uploads.
//!
//! The crate implements the core of a feedback-submission feature:
//! - A form snapshot with category, title, message and up to six images
//! - A reducer that turns user edits and async results into new snapshots
//! - An upload coordinator that uploads pending images with at most six in
//!   flight and reports completion with a join barrier
//! - A controller loop that guarantees a single in-flight commit and submits
//!   each report exactly once
//!
//! Rendering, image picking and network transports live outside this crate;
//! they consume snapshots and produce events.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Presentation (not in this crate) / headless bin    │  ← Events in, snapshots out
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Reducer (handle_event)                           │
//! │  - Controller loop and handle                       │
//! │  - ViewState selectors                              │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Worker Layer  │   │ Service Layer │   │ Observability │
//! │ (worker/)     │   │ (service/)    │   │ (tracing)     │
//! │ - Semaphore   │   │ - Traits      │   │ - EnvFilter   │
//! │ - Join barrier│   │ - JSON outbox │   │ - Rotating    │
//! │               │   │ - Local files │   │   log file    │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data paths, image loading (infrastructure/)      │
//! │  - Errors, images, params (domain/)                 │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: View state, reducer and controller loop
//! - [`domain`]: Core value types and errors
//! - [`infrastructure`]: Data directory resolution and image loading
//! - [`service`]: Submission and file service traits plus local implementations
//! - [`worker`]: Bounded-concurrency upload coordinator
//! - [`observability`]: Tracing subscriber setup
//!
//! # Configuration
//!
//! ```toml
//! upload_context = "feedback"
//! upload_concurrency = 6
//! trace_level = "debug"
//! log_file = "~/.local/share/feedback_form/feedback.log"
//! outbox_path = "~/.local/share/feedback_form/outbox.json"
//! upload_dir = "~/.local/share/feedback_form/uploads"
//! ```
//!
//! # Commit Flow
//!
//! 1. **Commit** with no pending images and a title: submit immediately.
//! 2. **Commit** with pending images: upload them (at most six at a time).
//! 3. **Batch finished**: if images are still pending, show
//!    `"N image(s) failed to upload"`; otherwise submit the uploaded URLs.
//! 4. **Submission result**: emit the submitted signal or show the error.
//!
//! Every failure clears the busy flag; the user retries by committing again.
//!
//! # Example
//!
//! ```rust
//! use feedback_form::{handle_event, Action, Category, Event, ViewState};
//!
//! let mut state = ViewState::default();
//! let events = [
//!     Event::CategoryChanged(Category::Bug),
//!     Event::TitleChanged("Crash on launch".into()),
//!     Event::Commit,
//! ];
//! let mut actions = vec![];
//! for event in &events {
//!     let (next, mut emitted) = handle_event(&state, event);
//!     state = next;
//!     actions.append(&mut emitted);
//! }
//! assert!(matches!(actions.as_slice(), [Action::Submit(_)]));
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod service;
pub mod worker;

pub use app::{
    handle_event, Action, Event, FeedbackController, FeedbackHandle, ViewState, MAX_IMAGES,
};
pub use domain::{
    ActionError, Category, FeedbackError, FeedbackParams, FileDescriptor, ImageData, ImageSource,
    PendingImage, Result, UploadContext,
};
pub use service::{DirectoryFileService, FileService, OutboxSubmissionService, SubmissionService};
pub use worker::{BatchSummary, UploadCoordinator, UploadEvent, UploadSettings};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime configuration.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace passed to the file service. Default: `"feedback"`
    pub upload_context: String,

    /// Maximum uploads in flight. Clamped to `1..=6`. Default: 6
    pub upload_concurrency: usize,

    /// Tracing filter directive used when `RUST_LOG` is unset.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`, or any
    /// `EnvFilter` directive. Default: `"info"`
    pub trace_level: Option<String>,

    /// Write logs to this rotating file instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Outbox file for the local submission service.
    /// Default: `<data dir>/outbox.json`
    pub outbox_path: Option<PathBuf>,

    /// Directory for the local file service. Default: `<data dir>/uploads`
    pub upload_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_context: "feedback".to_string(),
            upload_concurrency: worker::MAX_CONCURRENT_UPLOADS,
            trace_level: None,
            log_file: None,
            outbox_path: None,
            upload_dir: None,
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = infrastructure::expand_tilde(path.as_ref());
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| FeedbackError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Builds configuration from string key/value pairs.
    ///
    /// Unknown keys are ignored and unparsable values fall back to their
    /// defaults, so a partially broken map still yields a usable config.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use feedback_form::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("upload_concurrency".to_string(), "3".to_string());
    /// map.insert("trace_level".to_string(), "debug".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.upload_concurrency, 3);
    /// assert_eq!(config.trace_level.as_deref(), Some("debug"));
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let upload_context = map
            .get("upload_context")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.upload_context);

        let upload_concurrency = map
            .get("upload_concurrency")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.upload_concurrency);

        let path = |key: &str| map.get(key).filter(|s| !s.is_empty()).map(PathBuf::from);

        Self {
            upload_context,
            upload_concurrency,
            trace_level: map.get("trace_level").cloned(),
            log_file: path("log_file"),
            outbox_path: path("outbox_path"),
            upload_dir: path("upload_dir"),
        }
    }

    /// Upload coordinator settings derived from this config.
    #[must_use]
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            context: UploadContext::new(self.upload_context.clone()),
            max_concurrency: self
                .upload_concurrency
                .clamp(1, worker::MAX_CONCURRENT_UPLOADS),
        }
    }

    #[must_use]
    pub fn resolved_outbox_path(&self) -> PathBuf {
        self.outbox_path.as_deref().map_or_else(
            || infrastructure::get_data_dir().join("outbox.json"),
            infrastructure::expand_tilde,
        )
    }

    #[must_use]
    pub fn resolved_upload_dir(&self) -> PathBuf {
        self.upload_dir.as_deref().map_or_else(
            || infrastructure::get_data_dir().join("uploads"),
            infrastructure::expand_tilde,
        )
    }
}

/// Builds a controller wired to the local outbox and directory services.
///
/// # Errors
///
/// Returns an error if the outbox directory cannot be created.
///
/// # Example
///
/// ```rust,no_run
/// use feedback_form::{initialize, Config};
///
/// # async fn demo() -> feedback_form::Result<()> {
/// let (controller, handle) = initialize(&Config::default())?;
/// let task = controller.spawn();
/// handle.title_update("Crash on launch")?;
/// # drop(handle);
/// # task.await.ok();
/// # Ok(())
/// # }
/// ```
pub fn initialize(config: &Config) -> Result<(FeedbackController, FeedbackHandle)> {
    tracing::debug!(config = ?config, "initializing feedback form");

    let files = DirectoryFileService::new(config.resolved_upload_dir());
    let outbox = OutboxSubmissionService::new(config.resolved_outbox_path())?;

    Ok(FeedbackController::new(
        Arc::new(files),
        Arc::new(outbox),
        config.upload_settings(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.toml");
        std::fs::write(
            &path,
            "upload_context = \"support\"\nupload_concurrency = 2\noutbox_path = \"/tmp/o.json\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.upload_context, "support");
        assert_eq!(config.upload_concurrency, 2);
        assert_eq!(config.resolved_outbox_path(), PathBuf::from("/tmp/o.json"));
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.toml");
        std::fs::write(&path, "upload_concurrency = \"many\"").unwrap();

        assert!(matches!(Config::from_file(&path), Err(FeedbackError::Config(_))));
    }

    #[test]
    fn from_map_falls_back_on_bad_values() {
        let map = BTreeMap::from([
            ("upload_concurrency".to_string(), "lots".to_string()),
            ("upload_context".to_string(), "  ".to_string()),
            ("log_file".to_string(), String::new()),
        ]);
        let config = Config::from_map(&map);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn upload_settings_clamp_concurrency() {
        let config = Config {
            upload_concurrency: 50,
            ..Config::default()
        };
        assert_eq!(config.upload_settings().max_concurrency, 6);

        let config = Config {
            upload_concurrency: 0,
            ..Config::default()
        };
        assert_eq!(config.upload_settings().max_concurrency, 1);
        assert_eq!(config.upload_settings().context.as_str(), "feedback");
    }

    #[test]
    fn default_paths_live_in_data_dir() {
        let config = Config::default();
        assert!(config.resolved_outbox_path().ends_with("feedback_form/outbox.json"));
        assert!(config.resolved_upload_dir().ends_with("feedback_form/uploads"));
    }
}
