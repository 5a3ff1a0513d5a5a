//! Configuration management for the spikeburst CLI
//!
//! Defaults for the encoder and the burst detectors live in a `spikeburst.toml`
//! file. Lookup order: an explicit `--config` path, then `spikeburst.toml` in the
//! workspace directory, then the user config directory, then built-in defaults.
//! Command-line flags override whatever the file provides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spikeburst_core::{BurstParams, EncoderParams, InterpolationKind};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Name of the per-workspace configuration file
pub const WORKSPACE_CONFIG_FILE: &str = "spikeburst.toml";

/// Global CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeburstConfig {
    /// Signal-to-spike encoder defaults
    pub encoder: EncoderSection,

    /// Burst detector defaults
    pub bursts: BurstSection,

    /// Output preferences
    pub output: OutputSection,
}

/// `[encoder]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSection {
    pub threshold_up: f64,
    pub threshold_down: f64,
    pub refractory_period: f64,
    pub interpolation_factor: Option<f64>,
    pub interpolation: InterpolationKind,
}

impl Default for EncoderSection {
    fn default() -> Self {
        let params = EncoderParams::default();
        Self {
            threshold_up: params.threshold_up,
            threshold_down: params.threshold_down,
            refractory_period: params.refractory_period,
            interpolation_factor: params.interpolation_factor,
            interpolation: params.interpolation,
        }
    }
}

/// `[bursts]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstSection {
    pub num_spikes_to_burst: usize,
    pub max_burst_duration: f64,
    pub min_inter_burst_interval: f64,
}

impl Default for BurstSection {
    fn default() -> Self {
        let params = BurstParams::default();
        Self {
            num_spikes_to_burst: params.num_spikes_to_burst,
            max_burst_duration: params.max_burst_duration,
            min_inter_burst_interval: params.min_inter_burst_interval,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Pretty-print JSON reports
    pub pretty: bool,

    /// Show progress bars for long-running commands
    pub show_progress: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            pretty: true,
            show_progress: true,
        }
    }
}

impl SpikeburstConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                CliError::config(format!("Invalid config file {}: {}", path.display(), e))
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("spikeburst").join("config.toml"))
    }

    /// Resolve the effective configuration for a run.
    ///
    /// An explicit path must exist; the other locations are optional.
    pub fn resolve(explicit: Option<&Path>, workspace: &Path) -> CliResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::missing_resource(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Using config {}", path.display());
            return Self::load_from_file(path);
        }

        let local = workspace.join(WORKSPACE_CONFIG_FILE);
        if local.exists() {
            debug!("Using workspace config {}", local.display());
            return Self::load_from_file(&local);
        }

        match Self::default_config_path() {
            Ok(user) if user.exists() => {
                debug!("Using user config {}", user.display());
                Self::load_from_file(&user)
            }
            _ => Ok(Self::default()),
        }
    }
}

impl EncoderSection {
    /// Validated encoder parameters
    pub fn to_params(&self) -> CliResult<EncoderParams> {
        let params = EncoderParams::new(self.threshold_up, self.threshold_down, self.refractory_period)?
            .with_interpolation_factor(self.interpolation_factor)
            .with_interpolation(self.interpolation);
        params.validate()?;
        Ok(params)
    }
}

impl BurstSection {
    /// Validated burst parameters
    pub fn to_params(&self) -> CliResult<BurstParams> {
        Ok(BurstParams::new(
            self.num_spikes_to_burst,
            self.max_burst_duration,
            self.min_inter_burst_interval,
        )?)
    }
}
