//! Infrastructure layer for filesystem and environment interactions.
//!
//! Path resolution for local data, and loading picked images from disk for
//! drivers that hand the form file paths instead of decoded images.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir};

use crate::domain::error::{FeedbackError, Result};
use crate::domain::ImageData;
use std::path::Path;

/// Reads an image file into an attachment payload.
///
/// The `~` prefix is expanded. The bytes are not decoded or validated
/// beyond rejecting empty files.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is empty.
pub async fn load_image(path: &Path) -> Result<ImageData> {
    let resolved = expand_tilde(path);
    let bytes = tokio::fs::read(&resolved).await?;
    if bytes.is_empty() {
        return Err(FeedbackError::Upload(format!(
            "image file is empty: {}",
            resolved.display()
        )));
    }
    tracing::debug!(path = ?resolved, bytes = bytes.len(), "image loaded");
    Ok(ImageData::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_image_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let image = load_image(&path).await.unwrap();
        assert_eq!(image.as_bytes(), b"\x89PNG");
    }

    #[tokio::test]
    async fn load_image_rejects_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(load_image(&path).await, Err(FeedbackError::Upload(_))));
    }
}
