//! Filesystem-backed provider.
//!
//! Each block is one `<id>.json` file under the store root. Useful offline and
//! as a stand-in for a remote provider in tests.

use crate::error::ApiError;
use crate::provider::StorageProvider;
use crate::types::{BlockSummary, FileContent, StorageBlock};
use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const URL_SCHEME: &str = "local://";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredBlock {
    block: StorageBlock,
    #[serde(default)]
    starred: bool,
    created_at: String,
    updated_at: String,
}

pub struct LocalProvider {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalProvider {
    pub const NAME: &'static str = "local";

    /// Open (creating if needed) a block store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create block store {}: {}",
                root.display(),
                e
            ))
        })?;
        let root = dunce::canonicalize(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_url(block_id: &str) -> String {
        format!("{}{}", URL_SCHEME, block_id)
    }

    fn path_for(&self, block_id: &str) -> Result<PathBuf, ApiError> {
        let valid = !block_id.is_empty()
            && block_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(ApiError::ProviderError(format!(
                "Invalid code block id: {}",
                block_id
            )));
        }
        Ok(self.root.join(format!("{}.json", block_id)))
    }

    fn read(&self, block_id: &str) -> Result<StoredBlock, ApiError> {
        let path = self.path_for(block_id)?;
        if !path.exists() {
            return Err(ApiError::ProviderError(format!(
                "Code block not found: {}",
                block_id
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, stored: &StoredBlock) -> Result<(), ApiError> {
        let path = self.path_for(&stored.block.id)?;
        let content = serde_json::to_string_pretty(stored)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    fn update<F>(&self, block_id: &str, mutate: F) -> Result<(), ApiError>
    where
        F: FnOnce(&mut StoredBlock) -> Result<(), ApiError>,
    {
        let _guard = self.write_lock.lock();
        let mut stored = self.read(block_id)?;
        mutate(&mut stored)?;
        stored.updated_at = Utc::now().to_rfc3339();
        self.write(&stored)
    }

    fn load_all(&self) -> Result<Vec<StoredBlock>, ApiError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            ApiError::ProviderError(format!(
                "Failed to read block store {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut loaded = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read directory entry in {}: {}",
                        self.root.display(),
                        e
                    );
                    continue;
                }
            };

            let path = entry.path();
            if path.extension() != Some(std::ffi::OsStr::new("json")) {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(ApiError::from)
                .and_then(|content| Ok(serde_json::from_str::<StoredBlock>(&content)?));
            match parsed {
                Ok(stored) => loaded.push(stored),
                Err(e) => {
                    tracing::warn!("Skipping unreadable block {}: {}", path.display(), e);
                }
            }
        }

        Ok(loaded)
    }
}

#[async_trait]
impl StorageProvider for LocalProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn is_authenticated(&self) -> bool {
        true
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list(&self, favorite_only: bool) -> Result<Vec<BlockSummary>, ApiError> {
        let mut blocks: Vec<StoredBlock> = self
            .load_all()?
            .into_iter()
            .filter(|stored| !favorite_only || stored.starred)
            .collect();
        blocks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(blocks
            .iter()
            .map(|stored| BlockSummary {
                url: Self::block_url(&stored.block.id),
                ..BlockSummary::from(&stored.block)
            })
            .collect())
    }

    async fn get_storage_block(&self, url: &str) -> Result<StorageBlock, ApiError> {
        let block_id = url.strip_prefix(URL_SCHEME).unwrap_or(url);
        self.get_storage_block_by_id(block_id).await
    }

    async fn get_storage_block_by_id(&self, id: &str) -> Result<StorageBlock, ApiError> {
        Ok(self.read(id)?.block)
    }

    async fn create_file(
        &self,
        file_name: &str,
        description: &str,
        content: &str,
        is_private: bool,
    ) -> Result<StorageBlock, ApiError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let path = self.path_for(&id)?;

        let mut files = IndexMap::new();
        files.insert(file_name.to_string(), FileContent::new(content));
        let block = StorageBlock {
            id: id.clone(),
            description: description.to_string(),
            is_private,
            html_url: format!("file://{}", path.display()),
            files,
        };

        let now = Utc::now().to_rfc3339();
        let stored = StoredBlock {
            block: block.clone(),
            starred: false,
            created_at: now.clone(),
            updated_at: now,
        };

        let _guard = self.write_lock.lock();
        self.write(&stored)?;
        tracing::info!(block_id = %id, file_name, "Created local code block");
        Ok(block)
    }

    async fn edit_file(
        &self,
        block_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<(), ApiError> {
        self.update(block_id, |stored| {
            match stored.block.files.get_mut(file_name) {
                Some(file) => file.content = content.to_string(),
                None => {
                    stored
                        .block
                        .files
                        .insert(file_name.to_string(), FileContent::new(content));
                }
            }
            Ok(())
        })
    }

    async fn remove_file_from_storage_block(
        &self,
        block_id: &str,
        file_name: &str,
    ) -> Result<(), ApiError> {
        self.update(block_id, |stored| {
            if stored.block.files.shift_remove(file_name).is_none() {
                return Err(ApiError::ProviderError(format!(
                    "File {} not found in code block {}",
                    file_name, block_id
                )));
            }
            Ok(())
        })
    }

    async fn delete_storage_block(&self, block_id: &str) -> Result<(), ApiError> {
        let path = self.path_for(block_id)?;
        let _guard = self.write_lock.lock();
        if !path.exists() {
            return Err(ApiError::ProviderError(format!(
                "Code block not found: {}",
                block_id
            )));
        }
        std::fs::remove_file(&path)?;
        tracing::info!(block_id, "Deleted local code block");
        Ok(())
    }

    async fn change_description(
        &self,
        block_id: &str,
        description: &str,
    ) -> Result<(), ApiError> {
        self.update(block_id, |stored| {
            stored.block.description = description.to_string();
            Ok(())
        })
    }

    async fn set_starred(&self, block_id: &str, starred: bool) -> Result<(), ApiError> {
        self.update(block_id, |stored| {
            stored.starred = starred;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn provider(temp: &TempDir) -> LocalProvider {
        LocalProvider::open(temp.path().join("blocks")).unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch_by_id_and_url() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);

        let block = provider
            .create_file("a.txt", "notes", "hello", true)
            .await
            .unwrap();
        assert!(!block.id.contains('_'));
        assert!(block.is_private);

        let by_id = provider.get_storage_block_by_id(&block.id).await.unwrap();
        assert_eq!(by_id, block);

        let summaries = provider.list(false).await.unwrap();
        assert_eq!(summaries.len(), 1);
        let by_url = provider.get_storage_block(&summaries[0].url).await.unwrap();
        assert_eq!(by_url.files["a.txt"].content, "hello");
    }

    #[tokio::test]
    async fn edit_adds_and_overwrites_files() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let block = provider.create_file("a.txt", "", "one", false).await.unwrap();

        provider.edit_file(&block.id, "a.txt", "two").await.unwrap();
        provider.edit_file(&block.id, "b.txt", "three").await.unwrap();

        let block = provider.get_storage_block_by_id(&block.id).await.unwrap();
        let names: Vec<_> = block.files.keys().cloned().collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(block.files["a.txt"].content, "two");
    }

    #[tokio::test]
    async fn edit_unknown_block_fails() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let err = provider.edit_file("deadbeef", "a.txt", "x").await.unwrap_err();
        assert!(matches!(err, ApiError::ProviderError(_)));
    }

    #[tokio::test]
    async fn ids_with_path_characters_are_rejected() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let err = provider
            .get_storage_block_by_id("../escape")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ProviderError(_)));
    }

    #[tokio::test]
    async fn remove_file_may_empty_the_block() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let block = provider.create_file("a.txt", "", "one", false).await.unwrap();

        provider
            .remove_file_from_storage_block(&block.id, "a.txt")
            .await
            .unwrap();
        let block = provider.get_storage_block_by_id(&block.id).await.unwrap();
        assert!(block.files.is_empty());
    }

    #[tokio::test]
    async fn starred_filter_and_delete() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let first = provider.create_file("a.txt", "first", "", false).await.unwrap();
        let second = provider.create_file("b.txt", "second", "", false).await.unwrap();
        provider.set_starred(&second.id, true).await.unwrap();

        let starred = provider.list(true).await.unwrap();
        assert_eq!(starred.len(), 1);
        assert_eq!(starred[0].id, second.id);

        provider.set_starred(&second.id, false).await.unwrap();
        assert!(provider.list(true).await.unwrap().is_empty());
        assert!(provider.set_starred("deadbeef", true).await.is_err());

        provider.delete_storage_block(&first.id).await.unwrap();
        assert_eq!(provider.list(false).await.unwrap().len(), 1);
        assert!(provider.delete_storage_block(&first.id).await.is_err());
    }

    #[tokio::test]
    async fn change_description_persists() {
        let temp = TempDir::new().unwrap();
        let provider = provider(&temp);
        let block = provider.create_file("a.txt", "old", "", false).await.unwrap();

        provider.change_description(&block.id, "new").await.unwrap();
        let block = provider.get_storage_block_by_id(&block.id).await.unwrap();
        assert_eq!(block.description, "new");
    }
}
