//! Configuration
//!
//! Layered configuration for blockpad: built-in defaults, the global config
//! file under `$XDG_CONFIG_HOME/blockpad/config.toml`, then `BLOCKPAD__*`
//! environment variables.

pub mod facade;
pub mod sources;
pub mod xdg;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockpadConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub scratch: ScratchSettings,
}

fn default_provider_name() -> String {
    "github".to_string()
}

/// Provider selection and per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider used when no selection has been persisted yet.
    #[serde(default = "default_provider_name")]
    pub default: String,

    #[serde(default)]
    pub github: GitHubSettings,

    #[serde(default)]
    pub local: LocalSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default: default_provider_name(),
            github: GitHubSettings::default(),
            local: LocalSettings::default(),
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

/// GitHub Gist provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Personal access token; when set the provider starts out authenticated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            token: None,
        }
    }
}

/// Filesystem-backed provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// Block store directory; None means `$XDG_DATA_HOME/blockpad/blocks`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Where working copies are allocated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScratchSettings {
    /// None means the OS temp directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}
