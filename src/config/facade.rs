//! ConfigLoader facade composing the configuration sources.

use super::sources::{environment, global_file};
use super::BlockpadConfig;
use crate::error::ApiError;
use config::{Config, File};
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<BlockpadConfig, ApiError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<BlockpadConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let builder = Config::builder().add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Create default configuration.
    pub fn default() -> BlockpadConfig {
        BlockpadConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_from_file_reads_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [provider]
            default = "local"

            [scratch]
            root = "/var/tmp/blockpad"

            [logging]
            level = "debug"
            output = "stderr"
            "#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.provider.default, "local");
        assert_eq!(
            config.scratch.root.as_deref(),
            Some(Path::new("/var/tmp/blockpad"))
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.output, "stderr");
    }

    #[test]
    fn load_from_missing_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let result = ConfigLoader::load_from_file(&temp.path().join("absent.toml"));
        assert!(matches!(result, Err(ApiError::ConfigError(_))));
    }
}
