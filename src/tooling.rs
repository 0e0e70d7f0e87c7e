//! Tooling & Integration Layer
//!
//! Terminal front end: a dialoguer-backed editor host, the clap CLI, and text
//! formatting for command results.

pub mod cli;
pub mod format;
pub mod terminal;

pub use cli::{Cli, CliContext, CliReport, Commands, ProviderCommands};
pub use terminal::TerminalHost;
