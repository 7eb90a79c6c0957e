//! Feedback categories and the submission payload.

use super::error::FeedbackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Topic the user files feedback under.
///
/// Serialized as a short lowercase code (`"bug"`, `"perf"`, ...), which is
/// also what [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bug,
    #[serde(rename = "perf")]
    Performance,
    Feature,
    Account,
    Other,
}

impl Category {
    /// Every category, in the order a picker lists them.
    pub const ALL: [Self; 5] = [
        Self::Bug,
        Self::Performance,
        Self::Feature,
        Self::Account,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Performance => "perf",
            Self::Feature => "feature",
            Self::Account => "account",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == code)
            .ok_or_else(|| FeedbackError::UnknownCategory(s.to_string()))
    }
}

/// Parameters handed to the submission service.
///
/// # Examples
///
/// ```
/// use feedback_form::{Category, FeedbackParams};
///
/// let params = FeedbackParams::new(None, "Crash on launch", "", vec![]);
/// assert_eq!(params.category, Category::Other);
/// assert_eq!(params.message, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackParams {
    pub category: Category,
    pub title: String,

    /// `None` when the user left the message empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Remote URLs of the uploaded attachments, in form order.
    pub images: Vec<String>,
}

impl FeedbackParams {
    /// Builds params the way a commit does: unset category falls back to
    /// [`Category::Other`] and an empty message is omitted.
    #[must_use]
    pub fn new(
        category: Option<Category>,
        title: impl Into<String>,
        message: &str,
        images: Vec<String>,
    ) -> Self {
        Self {
            category: category.unwrap_or(Category::Other),
            title: title.into(),
            message: (!message.is_empty()).then(|| message.to_string()),
            images,
        }
    }
}

/// Upload namespace passed to the file service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadContext(String);

impl UploadContext {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UploadContext {
    fn default() -> Self {
        Self::new("feedback")
    }
}

impl fmt::Display for UploadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!(" PERF ".parse::<Category>().unwrap(), Category::Performance);
        assert!(matches!(
            "weather".parse::<Category>(),
            Err(FeedbackError::UnknownCategory(name)) if name == "weather"
        ));
    }

    #[test]
    fn category_serializes_as_code() {
        let json = serde_json::to_string(&Category::Performance).unwrap();
        assert_eq!(json, "\"perf\"");
    }

    #[test]
    fn params_omit_empty_message() {
        let params = FeedbackParams::new(Some(Category::Bug), "Crash", "", vec![]);
        let json = serde_json::to_value(&params).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "category": "bug", "title": "Crash", "images": [] })
        );
    }

    #[test]
    fn params_keep_non_empty_message() {
        let params = FeedbackParams::new(None, "Slow", "takes 10s", vec!["u".into()]);
        assert_eq!(params.category, Category::Other);
        assert_eq!(params.message.as_deref(), Some("takes 10s"));
        assert_eq!(params.images, vec!["u".to_string()]);
    }
}
