//! Image attachments and their upload lifecycle.
//!
//! An attachment starts as [`ImageSource::Pending`] when the user picks it and
//! becomes [`ImageSource::Uploaded`] once the file service returns a remote
//! URL. The `key` is the identity token that ties the two states together.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Encoded bytes of a locally picked image.
///
/// Cheap to clone: the payload is shared behind an `Arc`, so snapshots and
/// upload tasks can hold the same image without copying it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageData(Arc<[u8]>);

impl ImageData {
    /// Wraps an encoded image payload.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageData")
            .field(&format_args!("{} bytes", self.0.len()))
            .finish()
    }
}

impl From<Vec<u8>> for ImageData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for ImageData {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

/// One attachment in the form, in either lifecycle state.
///
/// # Examples
///
/// ```
/// use feedback_form::{ImageData, ImageSource};
///
/// let pending = ImageSource::pending(ImageData::new(vec![1, 2, 3]), "k1");
/// let uploaded = ImageSource::uploaded("https://cdn/a.png", "k1");
/// assert_eq!(pending.key(), uploaded.key());
/// assert!(pending.is_pending());
/// assert_eq!(uploaded.url(), Some("https://cdn/a.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Picked locally, not uploaded yet.
    Pending { image: ImageData, key: String },

    /// Uploaded; `key` is the key of the pending entry it replaced.
    Uploaded { url: String, key: String },
}

impl ImageSource {
    #[must_use]
    pub fn pending(image: ImageData, key: impl Into<String>) -> Self {
        Self::Pending {
            image,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn uploaded(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Uploaded {
            url: url.into(),
            key: key.into(),
        }
    }

    /// Identity token shared by both lifecycle states.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Pending { key, .. } | Self::Uploaded { key, .. } => key,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Remote URL, for uploaded entries only.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Uploaded { url, .. } => Some(url),
            Self::Pending { .. } => None,
        }
    }

    /// Local payload, for pending entries only.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageData> {
        match self {
            Self::Pending { image, .. } => Some(image),
            Self::Uploaded { .. } => None,
        }
    }

    /// Splits a pending entry into the job handed to the upload coordinator.
    #[must_use]
    pub fn to_pending_image(&self) -> Option<PendingImage> {
        match self {
            Self::Pending { image, key } => Some(PendingImage {
                image: image.clone(),
                key: key.clone(),
            }),
            Self::Uploaded { .. } => None,
        }
    }
}

/// A pending image queued for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub image: ImageData,
    pub key: String,
}

impl PendingImage {
    /// Both a payload and a key are required before an upload is attempted.
    #[must_use]
    pub fn is_uploadable(&self) -> bool {
        !self.image.is_empty() && !self.key.is_empty()
    }
}

/// Remote file descriptor returned by the file service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Public URL of the uploaded file.
    pub url: String,

    /// Name the file was uploaded under; the attachment key.
    pub original_name: String,
}
