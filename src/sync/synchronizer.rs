//! Synchronizer operations over the current provider.
//!
//! A working copy is a live mirror: every save is pushed immediately, nothing
//! is cached for later reconciliation. Which block an editor belongs to is
//! recovered from its path (see [`crate::codec`]), with the in-session
//! [`WorkingCopyIndex`] consulted first.

use crate::codec;
use crate::error::ApiError;
use crate::host::{ActiveEditor, EditorHost, PickItem, ScratchSpace, ViewColumn};
use crate::provider::ProviderContext;
use crate::sync::{unique_file_name, BlockLockManager, WorkingCopyIndex};
use crate::types::{BlockSummary, DocumentIdentity, StorageBlock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A freshly materialized block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    pub block_id: String,
    pub dir: PathBuf,
    /// Written files in the block's file order.
    pub files: Vec<PathBuf>,
}

/// Result of deleting a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub block_id: String,
    /// Editors closed by the sweep.
    pub closed: Vec<PathBuf>,
}

pub struct Synchronizer {
    host: Arc<dyn EditorHost>,
    scratch: Arc<dyn ScratchSpace>,
    index: WorkingCopyIndex,
    locks: BlockLockManager,
}

impl Synchronizer {
    pub fn new(host: Arc<dyn EditorHost>, scratch: Arc<dyn ScratchSpace>) -> Self {
        Self {
            host,
            scratch,
            index: WorkingCopyIndex::new(),
            locks: BlockLockManager::new(),
        }
    }

    pub fn host(&self) -> &Arc<dyn EditorHost> {
        &self.host
    }

    /// Identity of a document path, or `None` if it is not part of a working copy.
    pub fn resolve_identity(&self, path: &Path) -> Option<DocumentIdentity> {
        self.index.resolve(path).or_else(|| codec::decode(path))
    }

    fn require_active_editor(&self) -> Result<ActiveEditor, ApiError> {
        self.host
            .active_editor()
            .ok_or_else(|| ApiError::ValidationError("No active editor".to_string()))
    }

    fn require_identity(&self, editor: &ActiveEditor) -> Result<DocumentIdentity, ApiError> {
        editor
            .path
            .as_deref()
            .and_then(|path| self.resolve_identity(path))
            .ok_or_else(|| {
                ApiError::ScopeError("The active document is not part of a code block".to_string())
            })
    }

    /// File name for new content: the document's own name, or a prompt for
    /// untitled ones. `None` when the prompt is cancelled or left empty.
    async fn file_name_for(&self, editor: &ActiveEditor) -> Result<Option<String>, ApiError> {
        let name = match editor.file_name() {
            Some(name) => name,
            None => match self.host.input_box("File name", None, false).await {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => return Ok(None),
            },
        };
        codec::validate_file_name(&name)?;
        Ok(Some(name))
    }

    /// Make sure the current provider is authenticated, prompting for credentials if not.
    pub async fn ensure_logged_in(&self, ctx: &ProviderContext) -> Result<(), ApiError> {
        let provider = ctx.provider();
        if provider.is_authenticated().await {
            return Ok(());
        }

        let username = self
            .host
            .input_box(&format!("{} username", provider.name()), None, false)
            .await
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::AuthError("Login is required".to_string()))?;
        let password = self
            .host
            .input_box(&format!("{} password or token", provider.name()), None, true)
            .await
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::AuthError("Login is required".to_string()))?;

        provider.login(username.trim(), &password).await?;
        if !provider.is_authenticated().await {
            return Err(ApiError::AuthError(format!(
                "Login to {} did not complete",
                provider.name()
            )));
        }
        info!(provider = %provider.name(), "Logged in");
        Ok(())
    }

    pub async fn list_code_blocks(
        &self,
        ctx: &ProviderContext,
        favorite_only: bool,
    ) -> Result<Vec<BlockSummary>, ApiError> {
        self.ensure_logged_in(ctx).await?;
        ctx.provider().list(favorite_only).await
    }

    /// Login gate, list, quick-pick, fetch. `None` if nothing was picked.
    pub async fn select_code_block(
        &self,
        ctx: &ProviderContext,
        favorite_only: bool,
    ) -> Result<Option<StorageBlock>, ApiError> {
        let summaries = self.list_code_blocks(ctx, favorite_only).await?;
        if summaries.is_empty() {
            self.host.show_info("No code blocks found");
            return Ok(None);
        }

        let items: Vec<PickItem> = summaries
            .iter()
            .map(|summary| {
                let visibility = if summary.is_private { "private" } else { "public" };
                PickItem::new(summary.label()).with_detail(format!(
                    "{} file(s), {}",
                    summary.file_count, visibility
                ))
            })
            .collect();

        let picked = match self.host.quick_pick("Select a code block", &items).await {
            Some(i) if i < summaries.len() => i,
            _ => return Ok(None),
        };

        let block = ctx
            .provider()
            .get_storage_block(&summaries[picked].url)
            .await?;
        Ok(Some(block))
    }

    /// Materialize `block` in a new working copy and open every file.
    ///
    /// Every file name must stay inside the working copy; nothing is closed
    /// or written otherwise. Visible editors are closed first: opening a
    /// block replaces the whole editor state rather than merging into it.
    /// The first file takes the primary view, the rest open in splits, in
    /// the block's file order.
    pub async fn open_code_block(&self, block: &StorageBlock) -> Result<WorkingCopy, ApiError> {
        let prefix = codec::encode_prefix(&block.id)?;
        for file_name in block.files.keys() {
            codec::validate_file_name(file_name)?;
        }

        if !self.host.visible_editors().is_empty() {
            debug!("Closing visible editors before opening block {}", block.id);
            self.host.close_all_editors().await?;
        }

        let dir = self.scratch.allocate(&prefix)?;
        self.index.register(dir.clone(), &block.id);

        let mut files = Vec::with_capacity(block.files.len());
        for (file_name, file) in &block.files {
            let path = dir.join(file_name);
            self.scratch.write_file(&path, file.content.as_bytes())?;
            files.push(path);
        }

        for (i, path) in files.iter().enumerate() {
            let column = if i == 0 {
                ViewColumn::Primary
            } else {
                ViewColumn::Split(i)
            };
            self.host.open_document(path, column).await?;
        }

        info!(
            block_id = %block.id,
            dir = %dir.display(),
            files = files.len(),
            "Opened code block"
        );
        Ok(WorkingCopy {
            block_id: block.id.clone(),
            dir,
            files,
        })
    }

    pub async fn open_code_block_by_id(
        &self,
        ctx: &ProviderContext,
        block_id: &str,
    ) -> Result<WorkingCopy, ApiError> {
        codec::validate_block_id(block_id)?;
        self.ensure_logged_in(ctx).await?;
        let block = ctx.provider().get_storage_block_by_id(block_id).await?;
        self.open_code_block(&block).await
    }

    /// Menu flow: pick a block, then open it.
    pub async fn open_selected_code_block(
        &self,
        ctx: &ProviderContext,
        favorite_only: bool,
    ) -> Result<Option<WorkingCopy>, ApiError> {
        match self.select_code_block(ctx, favorite_only).await? {
            Some(block) => Ok(Some(self.open_code_block(&block).await?)),
            None => Ok(None),
        }
    }

    /// Create a block from the focused editor's selection or whole text.
    ///
    /// `None` when the user cancels a prompt.
    pub async fn create_code_block(
        &self,
        ctx: &ProviderContext,
        is_private: bool,
    ) -> Result<Option<StorageBlock>, ApiError> {
        let editor = self.require_active_editor()?;
        let Some(file_name) = self.file_name_for(&editor).await? else {
            return Ok(None);
        };
        let Some(description) = self.host.input_box("Description", None, false).await else {
            return Ok(None);
        };

        let block = ctx
            .provider()
            .create_file(
                &file_name,
                description.trim(),
                editor.effective_text(),
                is_private,
            )
            .await?;
        info!(block_id = %block.id, file_name = %file_name, "Created code block");
        Ok(Some(block))
    }

    /// Add the focused editor's text as a new file of a picked block.
    ///
    /// Never overwrites: a taken name becomes `base1.ext`, `base2.ext`, ...
    /// Returns the persisted file name, `None` when the user cancels.
    pub async fn add_to_code_block(&self, ctx: &ProviderContext) -> Result<Option<String>, ApiError> {
        let editor = self.require_active_editor()?;
        let Some(candidate) = self.file_name_for(&editor).await? else {
            return Ok(None);
        };
        let Some(selected) = self.select_code_block(ctx, false).await? else {
            return Ok(None);
        };

        let _guard = self.locks.lock(&selected.id).await;
        let provider = ctx.provider();
        let block = provider.get_storage_block_by_id(&selected.id).await?;
        let file_name = unique_file_name(&candidate, |name| block.has_file(name));

        provider
            .edit_file(&block.id, &file_name, editor.effective_text())
            .await?;
        info!(block_id = %block.id, file_name = %file_name, "Added file to code block");
        Ok(Some(file_name))
    }

    /// Delete the focused editor's file from its block and close the editor.
    pub async fn remove_file_from_code_block(
        &self,
        ctx: &ProviderContext,
    ) -> Result<DocumentIdentity, ApiError> {
        let editor = self.require_active_editor()?;
        let identity = self.require_identity(&editor)?;

        ctx.provider()
            .remove_file_from_storage_block(&identity.storage_block_id, &identity.file_name)
            .await?;
        if let Some(path) = editor.path.as_deref() {
            self.host.close_editor(path).await?;
        }

        info!(
            block_id = %identity.storage_block_id,
            file_name = %identity.file_name,
            "Removed file from code block"
        );
        Ok(identity)
    }

    /// Delete the focused editor's block, then close every visible editor bound to it.
    pub async fn delete_code_block(&self, ctx: &ProviderContext) -> Result<DeleteOutcome, ApiError> {
        let editor = self.require_active_editor()?;
        let identity = self.require_identity(&editor)?;
        let block_id = identity.storage_block_id;

        ctx.provider().delete_storage_block(&block_id).await?;

        let mut closed = Vec::new();
        for path in self.host.visible_editors() {
            let bound = self
                .resolve_identity(&path)
                .is_some_and(|id| id.storage_block_id == block_id);
            if bound {
                self.host.close_editor(&path).await?;
                closed.push(path);
            }
        }
        self.index.forget_block(&block_id);
        self.locks.cleanup_unused();

        info!(block_id = %block_id, closed = closed.len(), "Deleted code block");
        Ok(DeleteOutcome { block_id, closed })
    }

    /// Push a saved document to its block. Documents outside any working
    /// copy are ignored and yield `None`.
    pub async fn on_save_text_document(
        &self,
        ctx: &ProviderContext,
        path: &Path,
        text: &str,
    ) -> Result<Option<DocumentIdentity>, ApiError> {
        let Some(identity) = self.resolve_identity(path) else {
            debug!(path = %path.display(), "Save outside any working copy, ignoring");
            return Ok(None);
        };

        ctx.provider()
            .edit_file(&identity.storage_block_id, &identity.file_name, text)
            .await?;
        info!(
            block_id = %identity.storage_block_id,
            file_name = %identity.file_name,
            bytes = text.len(),
            "Pushed saved document"
        );
        Ok(Some(identity))
    }

    /// Star or unstar a block by id.
    pub async fn star_code_block(
        &self,
        ctx: &ProviderContext,
        block_id: &str,
        starred: bool,
    ) -> Result<(), ApiError> {
        codec::validate_block_id(block_id)?;
        self.ensure_logged_in(ctx).await?;
        ctx.provider().set_starred(block_id, starred).await?;
        info!(block_id, starred, "Changed code block star");
        Ok(())
    }

    /// Prompt for a new description of the focused editor's block.
    ///
    /// An empty or cancelled prompt changes nothing and yields `None`.
    pub async fn change_code_block_description(
        &self,
        ctx: &ProviderContext,
    ) -> Result<Option<String>, ApiError> {
        let editor = self.require_active_editor()?;
        let identity = self.require_identity(&editor)?;
        let provider = ctx.provider();

        let block = provider
            .get_storage_block_by_id(&identity.storage_block_id)
            .await?;
        let description = match self
            .host
            .input_box("Description", Some(&block.description), false)
            .await
        {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => return Ok(None),
        };

        provider
            .change_description(&identity.storage_block_id, &description)
            .await?;
        info!(block_id = %identity.storage_block_id, "Changed code block description");
        Ok(Some(description))
    }
}
