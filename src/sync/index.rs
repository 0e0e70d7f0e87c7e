//! In-session map from allocated working-copy directories to block ids.
//!
//! Consulted before path decoding; paths this process did not allocate fall
//! through to [`crate::codec::decode`].

use crate::types::DocumentIdentity;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct WorkingCopyIndex {
    dirs: RwLock<HashMap<PathBuf, String>>,
}

impl WorkingCopyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, dir: PathBuf, block_id: &str) {
        self.dirs.write().insert(dir, block_id.to_string());
    }

    /// Identity of `path` if it lies inside a registered directory.
    pub fn resolve(&self, path: &Path) -> Option<DocumentIdentity> {
        let dirs = self.dirs.read();
        dirs.iter().find_map(|(dir, block_id)| {
            let relative = path.strip_prefix(dir).ok()?;
            let file_name = relative.to_str()?;
            if file_name.is_empty() {
                return None;
            }
            Some(DocumentIdentity {
                storage_block_id: block_id.clone(),
                file_name: file_name.to_string(),
            })
        })
    }

    /// Drop every directory registered for `block_id`.
    pub fn forget_block(&self, block_id: &str) -> usize {
        let mut dirs = self.dirs.write();
        let before = dirs.len();
        dirs.retain(|_, id| id != block_id);
        before - dirs.len()
    }

    pub fn len(&self) -> usize {
        self.dirs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
