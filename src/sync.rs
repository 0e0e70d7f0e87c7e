//! Working-copy synchronizer
//!
//! Materializes code blocks as local working copies and pushes local edits,
//! additions and deletions back to the current provider.

pub mod index;
pub mod locks;
pub mod naming;
pub mod synchronizer;

pub use index::WorkingCopyIndex;
pub use locks::BlockLockManager;
pub use naming::unique_file_name;
pub use synchronizer::{DeleteOutcome, Synchronizer, WorkingCopy};
