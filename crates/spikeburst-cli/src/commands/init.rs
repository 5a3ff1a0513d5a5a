//! Configuration initialization command

use std::path::Path;

use clap::Args;
use tracing::info;

use crate::config::{SpikeburstConfig, WORKSPACE_CONFIG_FILE};
use crate::error::{CliError, CliResult};

/// Write a default spikeburst.toml
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Write to the user config directory instead of the workspace
    #[arg(long)]
    pub user: bool,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl InitCommand {
    pub fn execute(self, workspace: &Path, explicit: Option<&Path>) -> CliResult<()> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None if self.user => SpikeburstConfig::default_config_path()?,
            None => workspace.join(WORKSPACE_CONFIG_FILE),
        };

        if path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        SpikeburstConfig::default().save_to_file(&path)?;
        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }
}
