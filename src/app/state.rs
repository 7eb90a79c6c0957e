//! Form view state and its derived selectors.
//!
//! [`ViewState`] is the single snapshot the presentation layer renders from.
//! Every operation here is pure: mutators take `&self` and return a new
//! snapshot, so the controller can replace its state wholesale and publish
//! the previous value unchanged to anyone still holding it.
//!
//! # Derived Values
//!
//! `remote_urls`, `remaining_pending` and `image_count` are computed from
//! `images` on every call and never stored. `commitable` is the exception:
//! it is stored, and only recomputed when a title or category event is
//! reduced (see [`ViewState::with_title`] and [`ViewState::with_category`]).
//!
//! # Example
//!
//! ```rust
//! use feedback_form::{Category, ImageData, ViewState};
//!
//! let state = ViewState::default()
//!     .with_category(Some(Category::Bug))
//!     .with_title("Crash on launch")
//!     .append_pending(vec![ImageData::new(vec![1, 2, 3])]);
//!
//! assert!(state.commitable);
//! assert_eq!(state.image_count(), 1);
//! assert_eq!(state.remaining_pending().len(), 1);
//! ```

use crate::domain::{ActionError, Category, FeedbackParams, ImageData, ImageSource};
use uuid::Uuid;

/// Maximum number of attachments per report.
pub const MAX_IMAGES: usize = 6;

/// Immutable snapshot of the feedback form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Selected category, `None` until the user picks one.
    pub category: Option<Category>,

    pub title: String,

    pub message: String,

    /// Attachments in display order. At most [`MAX_IMAGES`]; the controller
    /// enforces the cap before appending.
    pub images: Vec<ImageSource>,

    /// Whether the commit control is enabled.
    pub commitable: bool,

    /// An upload batch or a submission is in flight.
    pub is_actioning: bool,

    /// Failure of the last commit cycle, cleared when a new one starts.
    pub action_error: Option<ActionError>,
}

impl ViewState {
    /// Sets the category and recomputes `commitable`.
    #[must_use]
    pub fn with_category(&self, category: Option<Category>) -> Self {
        let mut next = self.clone();
        next.category = category;
        next.commitable = Self::is_commitable(&next.title, next.category);
        next
    }

    /// Sets the title and recomputes `commitable`.
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.title = title.into();
        next.commitable = Self::is_commitable(&next.title, next.category);
        next
    }

    /// Sets the message. Does not touch `commitable`.
    #[must_use]
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Appends each image as a pending entry under a fresh UUID key.
    ///
    /// Does not enforce [`MAX_IMAGES`]; callers truncate first.
    #[must_use]
    pub fn append_pending(&self, images: Vec<ImageData>) -> Self {
        let mut next = self.clone();
        next.images.extend(
            images
                .into_iter()
                .map(|image| ImageSource::pending(image, Uuid::new_v4().to_string())),
        );
        next
    }

    /// Removes the entry with the given key. No-op if the key is absent.
    #[must_use]
    pub fn delete(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.images.retain(|source| source.key() != key);
        next
    }

    /// Replaces the entry with the given key in place. No-op if absent.
    #[must_use]
    pub fn replace(&self, key: &str, with: ImageSource) -> Self {
        let mut next = self.clone();
        if let Some(index) = self.index_of(key) {
            next.images[index] = with;
        }
        next
    }

    /// Position of the first entry with the given key.
    #[must_use]
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.images.iter().position(|source| source.key() == key)
    }

    /// URLs of all uploaded entries, in order.
    #[must_use]
    pub fn remote_urls(&self) -> Vec<String> {
        self.images
            .iter()
            .filter_map(ImageSource::url)
            .map(String::from)
            .collect()
    }

    /// All pending entries, in order.
    #[must_use]
    pub fn remaining_pending(&self) -> Vec<&ImageSource> {
        self.images.iter().filter(|source| source.is_pending()).collect()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.images.iter().any(ImageSource::is_pending)
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// How many more images the picker may add.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        MAX_IMAGES.saturating_sub(self.images.len())
    }

    /// Submission parameters from this snapshot.
    #[must_use]
    pub fn submission_params(&self) -> FeedbackParams {
        FeedbackParams::new(self.category, self.title.clone(), &self.message, self.remote_urls())
    }

    fn is_commitable(title: &str, category: Option<Category>) -> bool {
        !title.is_empty() && category.is_some()
    }
}
