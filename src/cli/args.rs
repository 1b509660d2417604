//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `scan`: Report translatable text, dynamic keys and diagnostics
//! - `fix`: Rewrite pending candidates into access calls (dry-run by default)
//! - `init`: Write a default `.glotxrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Scan(cmd)) => cmd.common.verbose,
            Some(Command::Fix(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by `scan` and `fix`.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root; the config file is searched upward from here
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Key namespace (overrides config file)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Ignore and do not write the fingerprint cache
    #[arg(long)]
    pub no_cache: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct FixCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually rewrite files (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report hardcoded translatable text
    Scan(ScanCommand),
    /// Replace hardcoded text with translation calls
    Fix(FixCommand),
    /// Initialize a new .glotxrc.json configuration file
    Init,
}
