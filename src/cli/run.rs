use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{fix::fix, init::init, scan::scan},
    exit_status::ExitStatus,
};

/// Dispatches to the command handler.
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Scan(cmd)) => scan(cmd),
        Some(Command::Fix(cmd)) => fix(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
