//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: Find missing and unused locale keys
//! - `init`: Write a default `.keycheckrc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use super::commands::check::CheckRule;
use crate::core::LocaleKeyMode;

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

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }

    pub fn format(&self) -> OutputFormat {
        match &self.command {
            Some(Command::Check(cmd)) => cmd.args.format,
            Some(Command::Init) | None => OutputFormat::Text,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root; the config file is searched from here upward
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Locale file glob (overrides `localeDir` in the config file)
    #[arg(long)]
    pub locale_dir: Option<String>,

    /// How locale files map to locales (overrides config file)
    #[arg(long, value_enum)]
    pub locale_key: Option<LocaleKeyMode>,

    /// Source scan root (overrides config file)
    #[arg(long)]
    pub src: Option<String>,

    /// Comma-separated source file extensions (overrides config file)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Rules to run (default: all)
    #[arg(value_enum)]
    pub checks: Vec<CheckRule>,
    #[command(flatten)]
    pub args: CheckArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check for missing and unused locale keys
    Check(CheckCommand),
    /// Initialize a new .keycheckrc.json configuration file
    Init,
}
