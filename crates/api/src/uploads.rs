//! Staged uploads.
//!
//! A [`StagedUpload`] owns one file in the upload directory for the
//! lifetime of a request. The file is removed by [`StagedUpload::remove`]
//! on the normal path, and by `Drop` if the request future is dropped
//! or an error short-circuits the handler.

use std::io;
use std::path::{Path, PathBuf};

use winzaap_core::naming::{sanitize_basename, staged_upload_name};

/// A client upload persisted under a unique name.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
    removed: bool,
}

impl StagedUpload {
    /// Write `data` to `{dir}/{uuid}_{basename}`.
    ///
    /// If the write fails, the partially written file is removed when the
    /// guard drops.
    pub async fn persist(dir: &Path, original: Option<&str>, data: &[u8]) -> io::Result<Self> {
        let upload = Self {
            path: dir.join(staged_upload_name(original)),
            original_name: sanitize_basename(original),
            removed: false,
        };

        tokio::fs::write(&upload.path, data).await?;
        tracing::debug!(path = %upload.path.display(), size = data.len(), "Staged upload");

        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Client filename reduced to its final path component.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Delete the staged file. A file that is already gone is not an error.
    pub async fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed staged upload");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed staged upload on drop"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove staged upload",
            ),
        }
    }
}
