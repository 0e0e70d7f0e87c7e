//! Current-provider context passed to every synchronizer operation.

use crate::config::BlockpadConfig;
use crate::error::ApiError;
use crate::provider::storage::{ProviderSelectionStore, XdgSelectionStore};
use crate::provider::{GitHubProvider, LocalProvider, StorageProvider};
use indexmap::IndexMap;
use std::sync::Arc;

/// Providers known to this process, keyed by name in registration order.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: IndexMap<String, Arc<dyn StorageProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn StorageProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StorageProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }
}

/// Resolved "current provider" plus the store that remembers it.
///
/// Built once at startup; [`ProviderContext::switch_provider`] is the only way
/// to change the current provider.
pub struct ProviderContext {
    registry: ProviderRegistry,
    current: Arc<dyn StorageProvider>,
    selection: Arc<dyn ProviderSelectionStore>,
}

impl ProviderContext {
    /// Restore the persisted selection, falling back to `default_name` when
    /// nothing usable was persisted.
    pub fn new(
        registry: ProviderRegistry,
        selection: Arc<dyn ProviderSelectionStore>,
        default_name: &str,
    ) -> Result<Self, ApiError> {
        let persisted = selection.load()?;
        let current_name = match persisted {
            Some(name) if registry.contains(&name) => name,
            Some(name) => {
                tracing::warn!(
                    "Persisted provider '{}' is not available, using '{}'",
                    name,
                    default_name
                );
                default_name.to_string()
            }
            None => default_name.to_string(),
        };

        let current = registry.get(&current_name).ok_or_else(|| {
            ApiError::ConfigError(format!(
                "Unknown provider: {}. Available: {}",
                current_name,
                registry.names().join(", ")
            ))
        })?;

        tracing::debug!(provider = %current_name, "Provider context ready");
        Ok(Self {
            registry,
            current,
            selection,
        })
    }

    /// Build the GitHub and local providers from configuration.
    pub fn from_config(config: &BlockpadConfig) -> Result<Self, ApiError> {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(GitHubProvider::from_settings(
            &config.provider.github,
        )?));

        let local_root = match &config.provider.local.root {
            Some(root) => root.clone(),
            None => crate::config::xdg::local_blocks_dir()?,
        };
        registry.register(Arc::new(LocalProvider::open(local_root)?));

        Self::new(
            registry,
            Arc::new(XdgSelectionStore::new()),
            &config.provider.default,
        )
    }

    /// The current provider.
    pub fn provider(&self) -> Arc<dyn StorageProvider> {
        Arc::clone(&self.current)
    }

    pub fn provider_name(&self) -> &str {
        self.current.name()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Make `name` the current provider and persist the choice.
    pub fn switch_provider(&mut self, name: &str) -> Result<(), ApiError> {
        let next = self.registry.get(name).ok_or_else(|| {
            ApiError::ConfigError(format!(
                "Unknown provider: {}. Available: {}",
                name,
                self.registry.names().join(", ")
            ))
        })?;

        self.selection.save(name)?;
        tracing::info!(from = %self.current.name(), to = %name, "Switched provider");
        self.current = next;
        Ok(())
    }
}
