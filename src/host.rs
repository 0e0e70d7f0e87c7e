//! Host editor capabilities consumed by the synchronizer.

pub mod contract;
pub mod scratch;

pub use contract::{ActiveEditor, EditorHost, PickItem, ViewColumn};
pub use scratch::{LocalScratch, ScratchSpace};
