//! Persisted provider selection.

pub mod contract;
pub mod xdg;

pub use contract::{MemorySelectionStore, ProviderSelectionStore};
pub use xdg::XdgSelectionStore;
