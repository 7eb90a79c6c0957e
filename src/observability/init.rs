//! Tracing initialization and subscriber setup.

use super::file_writer::RotatingFileWriter;
use crate::infrastructure::expand_tilde;
use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor `trace_level` is set.
const DEFAULT_LEVEL: &str = "info";

/// Installs the global tracing subscriber.
///
/// # Level Resolution
///
/// 1. `RUST_LOG` environment variable
/// 2. `config.trace_level`
/// 3. `"info"`
///
/// # Output
///
/// With `config.log_file` set, events go to that file through a
/// [`RotatingFileWriter`] (10 MiB, 3 backups) without ANSI colors. Otherwise
/// they go to stderr.
///
/// # Initialization Behavior
///
/// - Creates the log file's parent directory if needed
/// - Falls back to stderr if that directory cannot be created
/// - Idempotent: only the first call installs a subscriber
///
/// # Example
///
/// ```rust
/// use feedback_form::observability::init_tracing;
/// use feedback_form::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    });

    let log_file = config.log_file.as_deref().map(expand_tilde).filter(|path| {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or(true, |parent| std::fs::create_dir_all(parent).is_ok())
    });

    let registry = tracing_subscriber::registry().with(filter);

    let result = match log_file {
        Some(path) => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(RotatingFileWriter::new(path)),
            )
            .try_init(),
        None => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!("tracing initialized");
    }
}
