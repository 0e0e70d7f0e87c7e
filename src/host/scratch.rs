//! Scratch space for working copies.

use crate::error::ApiError;
use std::path::{Path, PathBuf};

/// Allocates uniquely named directories and writes files into them.
pub trait ScratchSpace: Send + Sync {
    /// Create a fresh directory whose name starts with `prefix`.
    /// The directory outlives this call; nothing cleans it up.
    fn allocate(&self, prefix: &str) -> Result<PathBuf, ApiError>;

    /// Write `bytes` at `path`, creating parent directories for nested names.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), ApiError>;
}

/// Scratch space on the local filesystem, by default the OS temp directory.
pub struct LocalScratch {
    root: PathBuf,
}

impl LocalScratch {
    pub fn new(root: Option<PathBuf>) -> Result<Self, ApiError> {
        let root = root.unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root: dunce::canonicalize(&root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ScratchSpace for LocalScratch {
    fn allocate(&self, prefix: &str) -> Result<PathBuf, ApiError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.root)?;
        let path = dir.into_path();
        tracing::debug!(path = %path.display(), "Allocated working copy directory");
        Ok(path)
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), ApiError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
