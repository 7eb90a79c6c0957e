//! Structured logging setup.
//!
//! The crate logs through `tracing` everywhere: one debug span per reduced
//! event, one span per upload batch (with each upload task nested under it),
//! and one span per submission. This module installs the subscriber that
//! turns those spans and events into output.
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! Output goes to stderr, or to a rotating file when `log_file` is set.
//!
//! # Modules
//!
//! - `init`: Subscriber initialization
//! - `file_writer`: Rotating file writer with size-based rotation

mod file_writer;
mod init;

pub use file_writer::RotatingFileWriter;
pub use init::init_tracing;
