use crate::error::ApiError;
use crate::provider::storage::ProviderSelectionStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SelectionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
}

/// Selection persisted as TOML, by default at `$XDG_STATE_HOME/blockpad/state.toml`.
pub struct XdgSelectionStore {
    path: Option<PathBuf>,
}

impl XdgSelectionStore {
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Store backed by an explicit file instead of the XDG location.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn state_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => crate::config::xdg::state_file(),
        }
    }

    fn read_state(path: &Path) -> Result<SelectionState, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read provider selection {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to parse provider selection {}: {}",
                path.display(),
                e
            ))
        })
    }
}

impl Default for XdgSelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSelectionStore for XdgSelectionStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        let path = self.state_path()?;
        if !path.exists() {
            return Ok(None);
        }

        match Self::read_state(&path) {
            Ok(state) => Ok(state.provider.filter(|name| !name.trim().is_empty())),
            Err(e) => {
                tracing::warn!("Ignoring unreadable provider selection: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, provider_name: &str) -> Result<(), ApiError> {
        let path = self.state_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::ConfigError(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let state = SelectionState {
            provider: Some(provider_name.to_string()),
        };
        let toml_content = toml::to_string_pretty(&state).map_err(|e| {
            ApiError::ConfigError(format!("Failed to serialize provider selection: {}", e))
        })?;

        std::fs::write(&path, toml_content).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to write provider selection to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
