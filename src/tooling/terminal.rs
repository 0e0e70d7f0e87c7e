//! Editor host for a terminal session.
//!
//! "Editors" are the files this process has opened; prompts go through
//! dialoguer, notifications to stdout/stderr.

use crate::error::ApiError;
use crate::host::{ActiveEditor, EditorHost, PickItem, ViewColumn};
use async_trait::async_trait;
use dialoguer::{Input, Password, Select};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Default)]
pub struct TerminalHost {
    editors: Mutex<Vec<PathBuf>>,
    active: Mutex<Option<ActiveEditor>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus a document read from disk, registering it as a visible editor.
    pub fn focus_file(&self, path: &Path) -> Result<(), ApiError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ValidationError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let path = dunce::canonicalize(path)?;
        self.show_editor(path.clone());
        *self.active.lock() = Some(ActiveEditor {
            path: Some(path),
            text,
            selection: None,
        });
        Ok(())
    }

    /// Register an editor as visible without focusing it.
    pub fn show_editor(&self, path: PathBuf) {
        let mut editors = self.editors.lock();
        if !editors.contains(&path) {
            editors.push(path);
        }
    }
}

#[async_trait]
impl EditorHost for TerminalHost {
    async fn quick_pick(&self, placeholder: &str, items: &[PickItem]) -> Option<usize> {
        let labels: Vec<String> = items
            .iter()
            .map(|item| match &item.detail {
                Some(detail) => format!("{}  {}", item.label, detail.dimmed()),
                None => item.label.clone(),
            })
            .collect();

        match Select::new()
            .with_prompt(placeholder)
            .items(&labels)
            .default(0)
            .interact_opt()
        {
            Ok(choice) => choice,
            Err(e) => {
                tracing::warn!("Quick pick failed: {}", e);
                None
            }
        }
    }

    async fn input_box(
        &self,
        prompt: &str,
        value: Option<&str>,
        password: bool,
    ) -> Option<String> {
        let result = if password {
            Password::new().with_prompt(prompt).interact()
        } else {
            let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
            if let Some(value) = value {
                input = input.with_initial_text(value);
            }
            input.interact_text()
        };

        match result {
            Ok(answer) => Some(answer),
            Err(e) => {
                tracing::warn!("Input prompt failed: {}", e);
                None
            }
        }
    }

    fn show_info(&self, message: &str) {
        println!("{} {}", "info".green().bold(), message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("{} {}", "error".red().bold(), message);
    }

    fn visible_editors(&self) -> Vec<PathBuf> {
        self.editors.lock().clone()
    }

    fn active_editor(&self) -> Option<ActiveEditor> {
        self.active.lock().clone()
    }

    async fn open_document(&self, path: &Path, column: ViewColumn) -> Result<(), ApiError> {
        let view = match column {
            ViewColumn::Primary => "primary".to_string(),
            ViewColumn::Split(n) => format!("split {}", n),
        };
        println!("  {} {} {}", "opened".cyan(), path.display(), format!("[{}]", view).dimmed());
        self.show_editor(path.to_path_buf());
        Ok(())
    }

    async fn close_editor(&self, path: &Path) -> Result<(), ApiError> {
        self.editors.lock().retain(|p| p != path);
        let mut active = self.active.lock();
        if active.as_ref().and_then(|a| a.path.as_deref()) == Some(path) {
            *active = None;
        }
        println!("  {} {}", "closed".yellow(), path.display());
        Ok(())
    }

    async fn close_all_editors(&self) -> Result<(), ApiError> {
        self.editors.lock().clear();
        *self.active.lock() = None;
        Ok(())
    }

    fn open_external(&self, url: &str) -> Result<(), ApiError> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        std::process::Command::new(program).arg(url).spawn()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn focus_and_close_track_editors() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        std::fs::write(&file, "hello").unwrap();

        let host = TerminalHost::new();
        host.focus_file(&file).unwrap();
        let active = host.active_editor().unwrap();
        assert_eq!(active.text, "hello");
        assert_eq!(host.visible_editors().len(), 1);

        host.close_editor(active.path.as_deref().unwrap()).await.unwrap();
        assert!(host.visible_editors().is_empty());
        assert!(host.active_editor().is_none());
    }

    #[test]
    fn focusing_missing_file_is_validation_error() {
        let host = TerminalHost::new();
        let err = host.focus_file(Path::new("/nonexistent/blockpad/a.txt")).unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
    }
}
