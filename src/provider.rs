//! Storage providers
//!
//! A provider durably stores code blocks. The synchronizer only sees the
//! [`StorageProvider`] contract; [`ProviderContext`] decides which provider is
//! current and persists that choice.

pub mod context;
pub mod contract;
pub mod github;
pub mod local;
pub mod storage;

pub use context::{ProviderContext, ProviderRegistry};
pub use contract::StorageProvider;
pub use github::GitHubProvider;
pub use local::LocalProvider;
pub use storage::{ProviderSelectionStore, XdgSelectionStore};
