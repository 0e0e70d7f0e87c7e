//! Blockpad: edit remotely stored code blocks as local files
//!
//! A code block (a Gist, for example) is materialized as a working copy in a
//! scratch directory whose name encodes the block id. Saves, additions and
//! deletions made through the host editor are pushed straight back to the
//! current storage provider.

pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod provider;
pub mod sync;
pub mod tooling;
pub mod types;
pub mod watch;

pub use commands::{Command, CommandOutcome, CommandService};
pub use error::ApiError;
pub use provider::{ProviderContext, StorageProvider};
pub use sync::Synchronizer;
pub use types::{BlockSummary, DocumentIdentity, FileContent, StorageBlock};
