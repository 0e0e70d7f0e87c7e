//! CLI Tooling
//!
//! Command-line front end for blockpad. Each invocation builds the provider
//! context from configuration, runs one command through the
//! [`CommandService`], and prints the outcome.

use crate::commands::{Command, CommandOutcome, CommandService};
use crate::config::BlockpadConfig;
use crate::error::ApiError;
use crate::host::{EditorHost, LocalScratch, ScratchSpace};
use crate::provider::ProviderContext;
use crate::sync::{Synchronizer, WorkingCopy};
use crate::tooling::format::{format_outcome, format_section_heading};
use crate::tooling::terminal::TerminalHost;
use crate::watch::{SaveFilter, SaveWatcher};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

/// Blockpad - edit remote code blocks as local files
#[derive(Parser)]
#[command(name = "blockpad")]
#[command(about = "Edit remotely stored code blocks as ordinary local files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List code blocks of the current provider
    List {
        /// Only starred code blocks
        #[arg(long)]
        starred: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Open a code block as a local working copy
    Open {
        /// Code block id; pick interactively when omitted
        id: Option<String>,
        /// Pick among starred code blocks
        #[arg(long)]
        starred: bool,
        /// Do not watch the working copy for saves
        #[arg(long)]
        no_watch: bool,
    },
    /// Create a code block from a file
    Create {
        file: PathBuf,
        /// Create a private (secret) code block
        #[arg(long)]
        private: bool,
        /// Open the new code block in a browser
        #[arg(long)]
        browse: bool,
    },
    /// Add a file to a code block
    Add { file: PathBuf },
    /// Push a working-copy file to its code block
    Save { path: PathBuf },
    /// Remove a working-copy file from its code block
    Remove { path: PathBuf },
    /// Delete the code block a working-copy file belongs to
    Delete { path: PathBuf },
    /// Change the description of a working-copy file's code block
    Describe { path: PathBuf },
    /// Star a code block so `list --starred` includes it
    Star { id: String },
    /// Remove a code block's star
    Unstar { id: String },
    /// Log in to the current provider
    Login,
    /// Provider selection
    Provider {
        #[command(subcommand)]
        command: ProviderCommands,
    },
}

#[derive(Subcommand)]
pub enum ProviderCommands {
    /// Show the current provider and the available ones
    Show,
    /// Make a provider current
    Use { name: String },
}

/// Printed output and whether the command succeeded.
#[derive(Debug, Clone)]
pub struct CliReport {
    pub output: String,
    pub ok: bool,
}

impl CliReport {
    fn from_outcome(outcome: &CommandOutcome, format: &str) -> Result<Self, ApiError> {
        Ok(Self {
            output: format_outcome(outcome, format)?,
            ok: !matches!(outcome, CommandOutcome::Failed(_)),
        })
    }
}

/// Apply `--log-*` flags on top of the loaded configuration.
pub fn apply_log_overrides(cli: &Cli, config: &mut BlockpadConfig) {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
}

/// Nearest ancestor of `path` that is a working-copy directory.
fn working_copy_root(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .find(|dir| {
            dir.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&format!("{}_", crate::codec::TAG)))
        })
        .map(Path::to_path_buf)
}

pub struct CliContext {
    service: CommandService,
    host: Arc<TerminalHost>,
    runtime: Runtime,
}

impl CliContext {
    pub fn new(config: &BlockpadConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let host = Arc::new(TerminalHost::new());
        let scratch: Arc<dyn ScratchSpace> =
            Arc::new(LocalScratch::new(config.scratch.root.clone())?);
        let ctx = ProviderContext::from_config(config)?;
        let sync = Synchronizer::new(host.clone(), scratch);

        Ok(Self {
            service: CommandService::new(sync, ctx),
            host,
            runtime,
        })
    }

    /// Focus `path` and show every file of its working copy as a visible editor.
    fn focus_working_copy_file(&self, path: &Path) -> Result<(), ApiError> {
        self.host.focus_file(path)?;
        let canonical = dunce::canonicalize(path)?;
        if let Some(root) = working_copy_root(&canonical) {
            for entry in walkdir::WalkDir::new(&root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file())
            {
                self.host.show_editor(entry.into_path());
            }
        }
        Ok(())
    }

    fn run(&self, command: Command) -> CommandOutcome {
        self.runtime.block_on(self.service.execute(&command))
    }

    pub fn execute(&mut self, command: &Commands) -> Result<CliReport, ApiError> {
        let mut format = "text";
        let outcome = match command {
            Commands::List { starred, format: f } => {
                format = f.as_str();
                self.run(Command::ListCodeBlocks {
                    favorite_only: *starred,
                })
            }
            Commands::Open {
                id,
                starred,
                no_watch,
            } => {
                let outcome = match id {
                    Some(block_id) => self.run(Command::OpenCodeBlockById {
                        block_id: block_id.clone(),
                    }),
                    None => self.run(Command::OpenCodeBlock {
                        favorite_only: *starred,
                    }),
                };
                if let CommandOutcome::Opened(wc) = &outcome {
                    println!("{}", format_outcome(&outcome, format)?);
                    if !no_watch {
                        self.watch_working_copy(wc)?;
                    }
                    return Ok(CliReport {
                        output: String::new(),
                        ok: true,
                    });
                }
                outcome
            }
            Commands::Create {
                file,
                private,
                browse,
            } => {
                self.host.focus_file(file)?;
                let outcome = self.run(Command::CreateCodeBlock {
                    is_private: *private,
                });
                if let (CommandOutcome::Created(block), true) = (&outcome, *browse) {
                    self.host.open_external(&block.html_url)?;
                }
                outcome
            }
            Commands::Add { file } => {
                self.host.focus_file(file)?;
                self.run(Command::AddToCodeBlock)
            }
            Commands::Save { path } => {
                let canonical = dunce::canonicalize(path)?;
                let text = std::fs::read_to_string(&canonical)?;
                self.runtime
                    .block_on(self.service.on_save_text_document(&canonical, &text))
            }
            Commands::Remove { path } => {
                self.focus_working_copy_file(path)?;
                self.run(Command::RemoveFileFromCodeBlock)
            }
            Commands::Delete { path } => {
                self.focus_working_copy_file(path)?;
                self.run(Command::DeleteCodeBlock)
            }
            Commands::Describe { path } => {
                self.focus_working_copy_file(path)?;
                self.run(Command::ChangeCodeBlockDescription)
            }
            Commands::Star { id } => self.run(Command::StarCodeBlock {
                block_id: id.clone(),
                starred: true,
            }),
            Commands::Unstar { id } => self.run(Command::StarCodeBlock {
                block_id: id.clone(),
                starred: false,
            }),
            Commands::Login => self.run(Command::Login),
            Commands::Provider { command } => match command {
                ProviderCommands::Show => {
                    let ctx = self.service.context();
                    let mut out = format!("{}\n\n", format_section_heading("Providers"));
                    for name in ctx.registry().names() {
                        let marker = if name == ctx.provider_name() { "*" } else { " " };
                        out.push_str(&format!(" {} {}\n", marker, name));
                    }
                    return Ok(CliReport {
                        output: out,
                        ok: true,
                    });
                }
                ProviderCommands::Use { name } => self.service.switch_provider(name),
            },
        };

        CliReport::from_outcome(&outcome, format)
    }

    /// Push every changed file of `wc` until the watcher stops.
    fn watch_working_copy(&self, wc: &WorkingCopy) -> Result<(), ApiError> {
        let mut filter = SaveFilter::new();
        for path in &wc.files {
            if let Ok(text) = std::fs::read_to_string(path) {
                filter.seed(path, &text);
            }
        }

        let (rx, _watcher) = SaveWatcher::new(wc.dir.clone()).watch()?;
        info!(dir = %wc.dir.display(), "Watching working copy");
        println!("Watching {} for saves (Ctrl-C to stop)", wc.dir.display());

        for res in rx {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Watch error: {}", e);
                    continue;
                }
            };
            for save in SaveWatcher::save_events(&event) {
                let text = match std::fs::read_to_string(&save.path) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Cannot read {}: {}", save.path.display(), e);
                        continue;
                    }
                };
                if !filter.changed(&save.path, &text) {
                    continue;
                }
                let outcome = self
                    .runtime
                    .block_on(self.service.on_save_text_document(&save.path, &text));
                if let CommandOutcome::Saved(_) = outcome {
                    println!("{}", format_outcome(&outcome, "text")?);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_open_with_flags() {
        let cli = Cli::parse_from(["blockpad", "--log-level", "debug", "open", "abc123", "--no-watch"]);
        match &cli.command {
            Commands::Open { id, no_watch, .. } => {
                assert_eq!(id.as_deref(), Some("abc123"));
                assert!(*no_watch);
            }
            _ => panic!("expected open"),
        }

        let mut config = BlockpadConfig::default();
        apply_log_overrides(&cli, &mut config);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parses_create_flags() {
        let cli = Cli::parse_from(["blockpad", "create", "notes.md", "--private", "--browse"]);
        match cli.command {
            Commands::Create {
                file,
                private,
                browse,
            } => {
                assert_eq!(file, PathBuf::from("notes.md"));
                assert!(private);
                assert!(browse);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn parses_star_and_unstar() {
        let cli = Cli::parse_from(["blockpad", "star", "abc123"]);
        assert!(matches!(&cli.command, Commands::Star { id } if id == "abc123"));
        let cli = Cli::parse_from(["blockpad", "unstar", "abc123"]);
        assert!(matches!(&cli.command, Commands::Unstar { id } if id == "abc123"));
    }

    #[test]
    fn working_copy_root_finds_tagged_ancestor() {
        let path = Path::new("/tmp/blockpad_abc123_Xy9/src/main.rs");
        assert_eq!(
            working_copy_root(path),
            Some(PathBuf::from("/tmp/blockpad_abc123_Xy9"))
        );
        assert_eq!(working_copy_root(Path::new("/home/user/main.rs")), None);
    }
}
