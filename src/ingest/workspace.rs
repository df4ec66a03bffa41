//! Batch-scoped ephemeral storage.

use crate::core::errors::{DceResult, EnhanceError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// A uniquely named temporary directory owned by exactly one batch.
///
/// Uploaded bytes and extracted archive entries are materialized under the
/// workspace root for the duration of the batch. The directory is removed
/// exactly once: either through [`BatchWorkspace::release`], or on drop if
/// the caller never released it explicitly. Workspaces are never shared or
/// reused across batches.
pub struct BatchWorkspace {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl std::fmt::Debug for BatchWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchWorkspace")
            .field("root", &self.root)
            .finish()
    }
}

impl BatchWorkspace {
    /// Creates a fresh workspace with a unique root directory.
    pub fn create() -> DceResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("zero-dce-batch-")
            .tempdir()?;
        let root = dir.path().to_path_buf();
        debug!("created batch workspace at {}", root.display());
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    /// The directory all batch files live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively removes the workspace.
    ///
    /// Consumes the workspace, so removal can only happen once.
    pub fn release(mut self) -> DceResult<()> {
        if let Some(dir) = self.dir.take() {
            debug!("releasing batch workspace at {}", self.root.display());
            dir.close()
                .map_err(|e| EnhanceError::cleanup("failed to remove batch workspace", e))?;
        }
        Ok(())
    }
}

impl Drop for BatchWorkspace {
    fn drop(&mut self) {
        // TempDir's own drop removes the tree when release() was not called.
        if self.dir.is_some() {
            debug!(
                "batch workspace at {} dropped without explicit release",
                self.root.display()
            );
        }
    }
}
