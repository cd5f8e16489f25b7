use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use courier_system_movement::MovementConfig;
use serde::Deserialize;

const DEFAULT_FRAME_MILLIS: u64 = 16;

/// Settings read from the optional `--config` TOML file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CliConfig {
    /// Movement tunables handed to the controller.
    pub(crate) movement: MovementConfig,
    /// Simulated frame duration used when ticking the controller.
    pub(crate) frame_millis: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            frame_millis: DEFAULT_FRAME_MILLIS,
        }
    }
}

impl CliConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.movement.validate()?;
        if config.frame_millis == 0 {
            bail!("frame_millis must be positive");
        }
        Ok(config)
    }

    /// Frame duration as a [`Duration`].
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_millis)
    }
}
