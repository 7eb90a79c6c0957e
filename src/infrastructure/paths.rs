//! Filesystem locations for local service data.
//!
//! The outbox, stored uploads and the optional log file default to a
//! per-user data directory. Configured paths may start with `~`.

use std::path::{Path, PathBuf};

/// Directory name used under the platform data directory.
const APP_DIR: &str = "feedback_form";

/// Returns the data directory for feedback form storage.
///
/// Resolves to the platform data directory (`~/.local/share/feedback_form`
/// on Linux) and falls back to the system temp directory when no home
/// directory can be determined.
///
/// # Examples
///
/// ```
/// use feedback_form::infrastructure::get_data_dir;
///
/// assert!(get_data_dir().ends_with("feedback_form"));
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and all paths when no home directory is known, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use feedback_form::infrastructure::expand_tilde;
/// use std::path::Path;
///
/// assert_eq!(expand_tilde(Path::new("/absolute/path")), Path::new("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
