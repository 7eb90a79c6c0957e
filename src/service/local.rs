//! Directory-backed file service.
//!
//! Stores uploads under `<root>/<context>/<name>` and hands back `file://`
//! URLs. Used by the headless binary and for running the form offline.

use crate::domain::error::{FeedbackError, Result};
use crate::domain::{FileDescriptor, ImageData, UploadContext};
use crate::service::backend::FileService;
use futures_util::future::BoxFuture;
use std::path::{Component, Path, PathBuf};

/// File service writing into a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryFileService {
    root: PathBuf,
}

impl DirectoryFileService {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the target path, rejecting names that would escape the root.
    fn target(&self, context: &UploadContext, name: &str) -> Result<PathBuf> {
        let relative = Path::new(context.as_str()).join(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || name.is_empty() {
            return Err(FeedbackError::Upload(format!(
                "invalid upload name: {context}/{name}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl FileService for DirectoryFileService {
    fn upload(
        &self,
        image: ImageData,
        context: UploadContext,
        name: String,
    ) -> BoxFuture<'_, Result<FileDescriptor>> {
        Box::pin(async move {
            let target = self.target(&context, &name)?;
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, image.as_bytes()).await?;

            let absolute = tokio::fs::canonicalize(&target).await?;
            tracing::debug!(path = ?absolute, bytes = image.len(), "image stored");

            Ok(FileDescriptor {
                url: format!("file://{}", absolute.display()),
                original_name: name,
            })
        })
    }
}
