//! XDG Base Directory locations for blockpad files.

use crate::error::ApiError;
use std::path::PathBuf;

fn home() -> Result<PathBuf, ApiError> {
    std::env::var("HOME").map(PathBuf::from).map_err(|_| {
        ApiError::ConfigError("Could not determine home directory (HOME not set)".to_string())
    })
}

/// Returns `$XDG_CONFIG_HOME` if set, otherwise `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(dir));
    }
    Ok(home()?.join(".config"))
}

/// Returns `$XDG_DATA_HOME` if set, otherwise `$HOME/.local/share`
pub fn data_home() -> Result<PathBuf, ApiError> {
    if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(dir));
    }
    Ok(home()?.join(".local").join("share"))
}

/// Returns `$XDG_STATE_HOME` if set, otherwise `$HOME/.local/state`
pub fn state_home() -> Result<PathBuf, ApiError> {
    if let Ok(dir) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(dir));
    }
    Ok(home()?.join(".local").join("state"))
}

/// `$XDG_CONFIG_HOME/blockpad/config.toml`
pub fn config_file() -> Result<PathBuf, ApiError> {
    Ok(config_home()?.join("blockpad").join("config.toml"))
}

/// `$XDG_STATE_HOME/blockpad/state.toml`, holding the selected provider.
pub fn state_file() -> Result<PathBuf, ApiError> {
    Ok(state_home()?.join("blockpad").join("state.toml"))
}

/// Block store for the local provider.
///
/// Returns `$XDG_DATA_HOME/blockpad/blocks/`
/// Creates the directory if it doesn't exist
pub fn local_blocks_dir() -> Result<PathBuf, ApiError> {
    let blocks_dir = data_home()?.join("blockpad").join("blocks");

    if !blocks_dir.exists() {
        std::fs::create_dir_all(&blocks_dir).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create blocks directory {}: {}",
                blocks_dir.display(),
                e
            ))
        })?;
    }

    Ok(blocks_dir)
}
