//! Test doubles: a scripted editor host and an in-memory recording provider.

#![allow(dead_code)]

use async_trait::async_trait;
use blockpad::error::ApiError;
use blockpad::host::{ActiveEditor, EditorHost, LocalScratch, PickItem, ViewColumn};
use blockpad::provider::storage::MemorySelectionStore;
use blockpad::provider::{ProviderContext, ProviderRegistry, StorageProvider};
use blockpad::sync::Synchronizer;
use blockpad::types::{BlockSummary, FileContent, StorageBlock};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
pub struct FakeHost {
    pub picks: Mutex<VecDeque<Option<usize>>>,
    pub inputs: Mutex<VecDeque<Option<String>>>,
    pub prompts: Mutex<Vec<(String, Option<String>, bool)>>,
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub visible: Mutex<Vec<PathBuf>>,
    pub opened: Mutex<Vec<(PathBuf, ViewColumn)>>,
    pub closed: Mutex<Vec<PathBuf>>,
    pub close_all_calls: Mutex<usize>,
    pub active: Mutex<Option<ActiveEditor>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer_pick(&self, choice: Option<usize>) {
        self.picks.lock().push_back(choice);
    }

    pub fn answer_input(&self, value: Option<&str>) {
        self.inputs.lock().push_back(value.map(str::to_string));
    }

    pub fn show(&self, path: PathBuf) {
        self.visible.lock().push(path);
    }

    pub fn focus(&self, path: Option<PathBuf>, text: &str, selection: Option<&str>) {
        *self.active.lock() = Some(ActiveEditor {
            path,
            text: text.to_string(),
            selection: selection.map(str::to_string),
        });
    }
}

#[async_trait]
impl EditorHost for FakeHost {
    async fn quick_pick(&self, _placeholder: &str, _items: &[PickItem]) -> Option<usize> {
        self.picks.lock().pop_front().flatten()
    }

    async fn input_box(&self, prompt: &str, value: Option<&str>, password: bool) -> Option<String> {
        self.prompts
            .lock()
            .push((prompt.to_string(), value.map(str::to_string), password));
        self.inputs.lock().pop_front().flatten()
    }

    fn show_info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn visible_editors(&self) -> Vec<PathBuf> {
        self.visible.lock().clone()
    }

    fn active_editor(&self) -> Option<ActiveEditor> {
        self.active.lock().clone()
    }

    async fn open_document(&self, path: &Path, column: ViewColumn) -> Result<(), ApiError> {
        self.opened.lock().push((path.to_path_buf(), column));
        self.visible.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn close_editor(&self, path: &Path) -> Result<(), ApiError> {
        self.visible.lock().retain(|p| p != path);
        self.closed.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn close_all_editors(&self) -> Result<(), ApiError> {
        *self.close_all_calls.lock() += 1;
        self.visible.lock().clear();
        Ok(())
    }

    fn open_external(&self, _url: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login { username: String, password: String },
    List { favorite_only: bool },
    Create { file_name: String, description: String, content: String, is_private: bool },
    Edit { block_id: String, file_name: String, content: String },
    RemoveFile { block_id: String, file_name: String },
    Delete { block_id: String },
    Describe { block_id: String, description: String },
    Star { block_id: String, starred: bool },
}

/// In-memory provider that records every mutating call.
pub struct MemoryProvider {
    blocks: Mutex<IndexMap<String, StorageBlock>>,
    starred: Mutex<HashSet<String>>,
    pub calls: Mutex<Vec<Call>>,
    authenticated: Mutex<bool>,
    password: Option<String>,
    next_id: Mutex<u32>,
}

impl MemoryProvider {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            blocks: Mutex::new(IndexMap::new()),
            starred: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            authenticated: Mutex::new(true),
            password: None,
            next_id: Mutex::new(1),
        })
    }

    /// Provider that starts logged out and accepts only `password`.
    pub fn requiring_login(password: &str) -> Arc<Self> {
        Arc::new(Self {
            blocks: Mutex::new(IndexMap::new()),
            starred: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            authenticated: Mutex::new(false),
            password: Some(password.to_string()),
            next_id: Mutex::new(1),
        })
    }

    pub fn insert(&self, id: &str, description: &str, files: &[(&str, &str)]) -> StorageBlock {
        let block = StorageBlock {
            id: id.to_string(),
            description: description.to_string(),
            is_private: false,
            html_url: format!("https://example.test/{}", id),
            files: files
                .iter()
                .map(|(name, content)| (name.to_string(), FileContent::new(*content)))
                .collect(),
        };
        self.blocks.lock().insert(id.to_string(), block.clone());
        block
    }

    pub fn block(&self, id: &str) -> Option<StorageBlock> {
        self.blocks.lock().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::List { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn unknown(id: &str) -> ApiError {
        ApiError::ProviderError(format!("Code block not found: {}", id))
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn is_authenticated(&self) -> bool {
        *self.authenticated.lock()
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.record(Call::Login {
            username: username.to_string(),
            password: password.to_string(),
        });
        if self.password.as_deref().is_some_and(|p| p != password) {
            return Err(ApiError::AuthError("Bad credentials".to_string()));
        }
        *self.authenticated.lock() = true;
        Ok(())
    }

    async fn list(&self, favorite_only: bool) -> Result<Vec<BlockSummary>, ApiError> {
        self.record(Call::List { favorite_only });
        let starred = self.starred.lock().clone();
        Ok(self
            .blocks
            .lock()
            .values()
            .filter(|block| !favorite_only || starred.contains(&block.id))
            .map(|block| BlockSummary {
                url: format!("memory://{}", block.id),
                ..BlockSummary::from(block)
            })
            .collect())
    }

    async fn get_storage_block(&self, url: &str) -> Result<StorageBlock, ApiError> {
        let id = url.strip_prefix("memory://").unwrap_or(url);
        self.get_storage_block_by_id(id).await
    }

    async fn get_storage_block_by_id(&self, id: &str) -> Result<StorageBlock, ApiError> {
        self.block(id).ok_or_else(|| Self::unknown(id))
    }

    async fn create_file(
        &self,
        file_name: &str,
        description: &str,
        content: &str,
        is_private: bool,
    ) -> Result<StorageBlock, ApiError> {
        self.record(Call::Create {
            file_name: file_name.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            is_private,
        });
        let id = {
            let mut next = self.next_id.lock();
            let id = format!("block{}", *next);
            *next += 1;
            id
        };
        let mut block = self.insert(&id, description, &[(file_name, content)]);
        block.is_private = is_private;
        self.blocks.lock().insert(id, block.clone());
        Ok(block)
    }

    async fn edit_file(&self, block_id: &str, file_name: &str, content: &str) -> Result<(), ApiError> {
        self.record(Call::Edit {
            block_id: block_id.to_string(),
            file_name: file_name.to_string(),
            content: content.to_string(),
        });
        let mut blocks = self.blocks.lock();
        let block = blocks.get_mut(block_id).ok_or_else(|| Self::unknown(block_id))?;
        block
            .files
            .insert(file_name.to_string(), FileContent::new(content));
        Ok(())
    }

    async fn remove_file_from_storage_block(
        &self,
        block_id: &str,
        file_name: &str,
    ) -> Result<(), ApiError> {
        self.record(Call::RemoveFile {
            block_id: block_id.to_string(),
            file_name: file_name.to_string(),
        });
        let mut blocks = self.blocks.lock();
        let block = blocks.get_mut(block_id).ok_or_else(|| Self::unknown(block_id))?;
        block.files.shift_remove(file_name);
        Ok(())
    }

    async fn delete_storage_block(&self, block_id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete {
            block_id: block_id.to_string(),
        });
        self.blocks
            .lock()
            .shift_remove(block_id)
            .map(|_| ())
            .ok_or_else(|| Self::unknown(block_id))
    }

    async fn change_description(&self, block_id: &str, description: &str) -> Result<(), ApiError> {
        self.record(Call::Describe {
            block_id: block_id.to_string(),
            description: description.to_string(),
        });
        let mut blocks = self.blocks.lock();
        let block = blocks.get_mut(block_id).ok_or_else(|| Self::unknown(block_id))?;
        block.description = description.to_string();
        Ok(())
    }

    async fn set_starred(&self, block_id: &str, starred: bool) -> Result<(), ApiError> {
        self.record(Call::Star {
            block_id: block_id.to_string(),
            starred,
        });
        if !self.blocks.lock().contains_key(block_id) {
            return Err(Self::unknown(block_id));
        }
        let mut set = self.starred.lock();
        if starred {
            set.insert(block_id.to_string());
        } else {
            set.remove(block_id);
        }
        Ok(())
    }
}

pub struct Harness {
    pub temp: TempDir,
    pub host: Arc<FakeHost>,
    pub provider: Arc<MemoryProvider>,
    pub sync: Synchronizer,
    pub ctx: ProviderContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_provider(MemoryProvider::new())
    }

    pub fn with_provider(provider: Arc<MemoryProvider>) -> Self {
        let temp = TempDir::new().unwrap();
        let host = FakeHost::new();
        let scratch = Arc::new(LocalScratch::new(Some(temp.path().join("scratch"))).unwrap());
        let sync = Synchronizer::new(host.clone(), scratch);

        let mut registry = ProviderRegistry::new();
        registry.register(provider.clone());
        let ctx = ProviderContext::new(
            registry,
            Arc::new(MemorySelectionStore::new()),
            MemoryProvider::NAME,
        )
        .unwrap();

        Self {
            temp,
            host,
            provider,
            sync,
            ctx,
        }
    }

    /// A path shaped like a working-copy file this process never opened.
    pub fn foreign_working_copy_file(&self, block_id: &str, file_name: &str) -> PathBuf {
        self.temp
            .path()
            .join(format!("blockpad_{}_q1w2e3", block_id))
            .join(file_name)
    }
}

pub fn file_names(block: &StorageBlock) -> Vec<String> {
    block.files.keys().cloned().collect()
}

pub fn contents(block: &StorageBlock) -> HashMap<String, String> {
    block
        .files
        .iter()
        .map(|(k, v)| (k.clone(), v.content.clone()))
        .collect()
}
