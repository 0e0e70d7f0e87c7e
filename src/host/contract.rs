use crate::error::ApiError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Where an opened document is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewColumn {
    /// The main editor area.
    Primary,
    /// An additional split, numbered from 1.
    Split(usize),
}

/// An entry offered in a quick-pick list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub detail: Option<String>,
}

impl PickItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// The focused editor at the time a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEditor {
    /// None for untitled documents.
    pub path: Option<PathBuf>,
    pub text: String,
    /// Selected text; empty selections are `None`.
    pub selection: Option<String>,
}

impl ActiveEditor {
    /// Selection if non-empty, else the whole document.
    pub fn effective_text(&self) -> &str {
        match self.selection.as_deref() {
            Some(selection) if !selection.is_empty() => selection,
            _ => &self.text,
        }
    }

    /// File name of the backing document, if it has one.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .map(str::to_string)
    }
}

/// UI and editor primitives of the host.
///
/// Prompts are suspension points and return `None` when the user cancels.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Index of the picked item, `None` on cancel.
    async fn quick_pick(&self, placeholder: &str, items: &[PickItem]) -> Option<usize>;

    /// Free text input. `password` hides what is typed.
    async fn input_box(&self, prompt: &str, value: Option<&str>, password: bool)
        -> Option<String>;

    fn show_info(&self, message: &str);

    fn show_error(&self, message: &str);

    /// Paths of every visible editor.
    fn visible_editors(&self) -> Vec<PathBuf>;

    fn active_editor(&self) -> Option<ActiveEditor>;

    async fn open_document(&self, path: &Path, column: ViewColumn) -> Result<(), ApiError>;

    async fn close_editor(&self, path: &Path) -> Result<(), ApiError>;

    async fn close_all_editors(&self) -> Result<(), ApiError>;

    /// Hand a URL to the system browser.
    fn open_external(&self, url: &str) -> Result<(), ApiError>;
}
