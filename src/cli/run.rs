//! Dispatches parsed arguments to the command handlers.
//!
//! Returns `Err` only when a command cannot run at all (unreadable config,
//! an existing config file for `init`). Findings are part of the
//! `CommandResult`.

use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{check::check, init::init},
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Init) => init(),
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
