//! Core data types: remote code blocks and the identity of local documents.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Content of a single file inside a code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    pub content: String,
    /// Raw download URL, when the provider exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_url: Option<String>,
}

impl FileContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw_url: None,
        }
    }
}

/// A remote, versionless collection of named text files.
///
/// `files` keeps the provider's ordering; keys are unique and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBlock {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub is_private: bool,
    pub html_url: String,
    #[serde(default)]
    pub files: IndexMap<String, FileContent>,
}

impl StorageBlock {
    pub fn has_file(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }
}

/// Listing entry returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub id: String,
    pub url: String,
    pub description: String,
    pub is_private: bool,
    pub file_count: usize,
}

impl BlockSummary {
    /// Label shown in pickers; falls back to the id for blocks without a description.
    pub fn label(&self) -> String {
        if self.description.trim().is_empty() {
            self.id.clone()
        } else {
            self.description.clone()
        }
    }
}

impl From<&StorageBlock> for BlockSummary {
    fn from(block: &StorageBlock) -> Self {
        Self {
            id: block.id.clone(),
            url: block.html_url.clone(),
            description: block.description.clone(),
            is_private: block.is_private,
            file_count: block.files.len(),
        }
    }
}

/// Which block and file an open document belongs to. Derived from its path, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentIdentity {
    pub storage_block_id: String,
    pub file_name: String,
}
