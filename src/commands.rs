//! Command dispatch
//!
//! Single entry point per user-facing command. Every error is caught here,
//! logged, and shown as one notification; nothing propagates to the host.

use crate::error::ApiError;
use crate::provider::ProviderContext;
use crate::sync::{DeleteOutcome, Synchronizer, WorkingCopy};
use crate::types::{BlockSummary, DocumentIdentity, StorageBlock};
use std::path::Path;
use tracing::error;

/// Prefix of every error notification.
pub const NOTIFICATION_TAG: &str = "Blockpad";

const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// User-facing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenCodeBlock { favorite_only: bool },
    OpenCodeBlockById { block_id: String },
    CreateCodeBlock { is_private: bool },
    AddToCodeBlock,
    RemoveFileFromCodeBlock,
    DeleteCodeBlock,
    ChangeCodeBlockDescription,
    ListCodeBlocks { favorite_only: bool },
    StarCodeBlock { block_id: String, starred: bool },
    Login,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::OpenCodeBlock { .. } => "open_code_block",
            Command::OpenCodeBlockById { .. } => "open_code_block_by_id",
            Command::CreateCodeBlock { .. } => "create_code_block",
            Command::AddToCodeBlock => "add_to_code_block",
            Command::RemoveFileFromCodeBlock => "remove_file_from_code_block",
            Command::DeleteCodeBlock => "delete_code_block",
            Command::ChangeCodeBlockDescription => "change_code_block_description",
            Command::ListCodeBlocks { .. } => "list_code_blocks",
            Command::StarCodeBlock { .. } => "star_code_block",
            Command::Login => "login",
        }
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Opened(WorkingCopy),
    Created(StorageBlock),
    Added { file_name: String },
    Removed(DocumentIdentity),
    Deleted(DeleteOutcome),
    DescriptionChanged(String),
    Listed(Vec<BlockSummary>),
    Starred { block_id: String, starred: bool },
    Saved(DocumentIdentity),
    ProviderSwitched(String),
    LoggedIn,
    /// The user dismissed a prompt, or the event did not concern blockpad.
    NoOp,
    /// The error was reported to the user; carries the notification text.
    Failed(String),
}

/// Notification text for a failed command.
pub fn format_error_message(err: &ApiError, provider_name: &str) -> String {
    let message = err.to_string();
    let message = if message.trim().is_empty() {
        UNKNOWN_ERROR
    } else {
        message.as_str()
    };
    format!("{}: {} ({})", NOTIFICATION_TAG, message, provider_name)
}

pub struct CommandService {
    sync: Synchronizer,
    ctx: ProviderContext,
}

impl CommandService {
    pub fn new(sync: Synchronizer, ctx: ProviderContext) -> Self {
        Self { sync, ctx }
    }

    pub fn context(&self) -> &ProviderContext {
        &self.ctx
    }

    fn report(&self, command: &str, err: ApiError) -> CommandOutcome {
        let message = format_error_message(&err, self.ctx.provider_name());
        error!(command, kind = err.kind(), "{}", message);
        self.sync.host().show_error(&message);
        CommandOutcome::Failed(message)
    }

    /// Run `command`, reporting any failure to the user.
    pub async fn execute(&self, command: &Command) -> CommandOutcome {
        match self.execute_inner(command).await {
            Ok(outcome) => outcome,
            Err(err) => self.report(command.name(), err),
        }
    }

    async fn execute_inner(&self, command: &Command) -> Result<CommandOutcome, ApiError> {
        let sync = &self.sync;
        let ctx = &self.ctx;
        let outcome = match command {
            Command::OpenCodeBlock { favorite_only } => sync
                .open_selected_code_block(ctx, *favorite_only)
                .await?
                .map(CommandOutcome::Opened)
                .unwrap_or(CommandOutcome::NoOp),
            Command::OpenCodeBlockById { block_id } => {
                CommandOutcome::Opened(sync.open_code_block_by_id(ctx, block_id).await?)
            }
            Command::CreateCodeBlock { is_private } => {
                match sync.create_code_block(ctx, *is_private).await? {
                    Some(block) => {
                        sync.host()
                            .show_info(&format!("Created code block {}", block.html_url));
                        CommandOutcome::Created(block)
                    }
                    None => CommandOutcome::NoOp,
                }
            }
            Command::AddToCodeBlock => match sync.add_to_code_block(ctx).await? {
                Some(file_name) => {
                    sync.host()
                        .show_info(&format!("Added {} to the code block", file_name));
                    CommandOutcome::Added { file_name }
                }
                None => CommandOutcome::NoOp,
            },
            Command::RemoveFileFromCodeBlock => {
                CommandOutcome::Removed(sync.remove_file_from_code_block(ctx).await?)
            }
            Command::DeleteCodeBlock => CommandOutcome::Deleted(sync.delete_code_block(ctx).await?),
            Command::ChangeCodeBlockDescription => {
                match sync.change_code_block_description(ctx).await? {
                    Some(description) => CommandOutcome::DescriptionChanged(description),
                    None => CommandOutcome::NoOp,
                }
            }
            Command::ListCodeBlocks { favorite_only } => {
                CommandOutcome::Listed(sync.list_code_blocks(ctx, *favorite_only).await?)
            }
            Command::StarCodeBlock { block_id, starred } => {
                sync.star_code_block(ctx, block_id, *starred).await?;
                CommandOutcome::Starred {
                    block_id: block_id.clone(),
                    starred: *starred,
                }
            }
            Command::Login => {
                sync.ensure_logged_in(ctx).await?;
                CommandOutcome::LoggedIn
            }
        };
        Ok(outcome)
    }

    /// Save event from the host. Failures are reported like any command.
    pub async fn on_save_text_document(&self, path: &Path, text: &str) -> CommandOutcome {
        match self.sync.on_save_text_document(&self.ctx, path, text).await {
            Ok(Some(identity)) => CommandOutcome::Saved(identity),
            Ok(None) => CommandOutcome::NoOp,
            Err(err) => self.report("save_text_document", err),
        }
    }

    /// Reconfiguration entry point for the current provider.
    pub fn switch_provider(&mut self, name: &str) -> CommandOutcome {
        match self.ctx.switch_provider(name) {
            Ok(()) => {
                self.sync
                    .host()
                    .show_info(&format!("Switched to provider {}", name));
                CommandOutcome::ProviderSwitched(name.to_string())
            }
            Err(err) => self.report("switch_provider", err),
        }
    }
}
