use crate::error::ApiError;
use parking_lot::Mutex;

/// One persisted key: the identifier of the currently selected provider.
pub trait ProviderSelectionStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ApiError>;
    fn save(&self, provider_name: &str) -> Result<(), ApiError>;
}

/// Selection kept in memory only; nothing survives the process.
#[derive(Default)]
pub struct MemorySelectionStore {
    selected: Mutex<Option<String>>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProviderSelectionStore for MemorySelectionStore {
    fn load(&self) -> Result<Option<String>, ApiError> {
        Ok(self.selected.lock().clone())
    }

    fn save(&self, provider_name: &str) -> Result<(), ApiError> {
        *self.selected.lock() = Some(provider_name.to_string());
        Ok(())
    }
}
