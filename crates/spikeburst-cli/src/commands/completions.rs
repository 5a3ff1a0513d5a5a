//! Shell completion generation

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use super::SpikeburstCli;
use crate::error::CliResult;

/// Print a completion script for the given shell
#[derive(Args, Debug)]
pub struct CompletionsCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsCommand {
    pub fn execute(self) -> CliResult<()> {
        let mut command = SpikeburstCli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(self.shell, &mut command, name, &mut std::io::stdout());
        Ok(())
    }
}
