//! Configuration sources layered by the loader.

pub mod global_file {
    //! Global config file: `$XDG_CONFIG_HOME/blockpad/config.toml`, optional.

    use crate::config::xdg;
    use config::builder::DefaultState;
    use config::{ConfigBuilder, ConfigError, File};

    pub fn add_to_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        match xdg::config_file() {
            Ok(path) => Ok(builder.add_source(File::from(path).required(false))),
            Err(e) => {
                tracing::debug!("Skipping global config file: {}", e);
                Ok(builder)
            }
        }
    }
}

pub mod environment {
    //! Environment variable source: BLOCKPAD prefix with __ separator

    use config::builder::DefaultState;
    use config::{ConfigBuilder, ConfigError, Environment};

    /// Add environment variable overlay to builder.
    /// Nested keys use `__`, e.g. `BLOCKPAD__PROVIDER__DEFAULT=local`.
    pub fn add_to_builder(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = builder.add_source(
            Environment::with_prefix("BLOCKPAD")
                .separator("__")
                .try_parsing(true),
        );
        Ok(builder)
    }
}
