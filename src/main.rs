//! Headless driver for the feedback form.
//!
//! Reads one JSON command per line from stdin, feeds it to the controller,
//! and prints every view state snapshot as a JSON line on stdout. Reports go
//! to the local outbox and images to the local upload directory, so the whole
//! commit cycle can be exercised without a UI or a network.
//!
//! # Usage
//!
//! ```text
//! feedback_form [config.toml] < commands.jsonl
//! ```
//!
//! # Commands
//!
//! - `{"category": "bug"}`
//! - `{"title": "Crash on launch"}`
//! - `{"message": "Happens after the update"}`
//! - `{"attach": ["~/Pictures/crash.png"]}`
//! - `{"delete": "<image key>"}`
//! - `"commit"`
//!
//! The driver exits when stdin closes and any in-flight commit has finished.

#![allow(clippy::multiple_crate_versions)]

use feedback_form::infrastructure::load_image;
use feedback_form::observability::init_tracing;
use feedback_form::{initialize, Category, Config, FeedbackHandle, ImageSource, ViewState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// One line of driver input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Command {
    Category(Category),
    Title(String),
    Message(String),
    Attach(Vec<PathBuf>),
    Delete(String),
    Commit,
}

/// Serializable view of a snapshot.
#[derive(Debug, Serialize)]
struct SnapshotLine<'a> {
    category: Option<Category>,
    title: &'a str,
    message: &'a str,
    images: Vec<ImageLine<'a>>,
    commitable: bool,
    is_actioning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageLine<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    pending: bool,
}

impl<'a> From<&'a ViewState> for SnapshotLine<'a> {
    fn from(state: &'a ViewState) -> Self {
        Self {
            category: state.category,
            title: &state.title,
            message: &state.message,
            images: state
                .images
                .iter()
                .map(|source: &ImageSource| ImageLine {
                    key: source.key(),
                    url: source.url(),
                    pending: source.is_pending(),
                })
                .collect(),
            commitable: state.commitable,
            is_actioning: state.is_actioning,
            action_error: state.action_error.as_ref().map(ToString::to_string),
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!(error = %e, "failed to serialize output line"),
    }
}

fn print_submitted() {
    print_json(&serde_json::json!({ "submitted": true }));
}

/// Prints signals still buffered once the controller has stopped.
fn drain_submitted(submitted: &mut broadcast::Receiver<()>) {
    loop {
        match submitted.try_recv() {
            Ok(()) => print_submitted(),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed = missed, "submitted signals dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

async fn apply(handle: &FeedbackHandle, command: Command) -> feedback_form::Result<()> {
    match command {
        Command::Category(category) => handle.category_update(category),
        Command::Title(title) => handle.title_update(title),
        Command::Message(message) => handle.message_update(message),
        Command::Delete(key) => handle.delete(key),
        Command::Commit => handle.commit(),
        Command::Attach(paths) => {
            let mut images = Vec::with_capacity(paths.len());
            for path in &paths {
                match load_image(path).await {
                    Ok(image) => images.push(image),
                    Err(e) => tracing::warn!(path = ?path, error = %e, "skipping image"),
                }
            }
            handle.append(images)
        }
    }
}

async fn run() -> feedback_form::Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::from_file(PathBuf::from(path))?,
        None => Config::default(),
    };
    init_tracing(&config);

    let (controller, handle) = initialize(&config)?;
    let mut snapshots = handle.view_state();
    let mut submitted = handle.submitted();
    let controller_task = controller.spawn();

    let printer = tokio::spawn(async move {
        let mut signals_open = true;
        loop {
            tokio::select! {
                biased;
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        drain_submitted(&mut submitted);
                        break;
                    }
                    let state = snapshots.borrow_and_update().clone();
                    print_json(&SnapshotLine::from(&state));
                }
                signal = submitted.recv(), if signals_open => match signal {
                    Ok(()) => print_submitted(),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed = missed, "submitted signals dropped");
                    }
                    Err(RecvError::Closed) => signals_open = false,
                },
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(line) {
            Ok(command) => apply(&handle, command).await?,
            Err(e) => tracing::warn!(line = %line, error = %e, "ignoring malformed command"),
        }
    }

    drop(handle);
    if let Err(e) = controller_task.await {
        tracing::error!(error = %e, "controller task failed");
    }
    if let Err(e) = printer.await {
        tracing::error!(error = %e, "output task failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("feedback_form: {e}");
            ExitCode::FAILURE
        }
    }
}
