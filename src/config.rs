//! Player configuration for the `playtone` binary.
//!
//! ```yaml
//! channel: 2
//! max-passes: 4
//! log-filter: playtone=debug
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::Deserialize;

use crate::error::PlayError;
use crate::playback::PlayerOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlayerConfig {
    /// Output channel reported by the tone generator
    pub channel: u8,
    /// Cap on passes through a repeating tune
    pub max_passes: Option<u32>,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
}

impl PlayerConfig {
    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self, PlayError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, PlayError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| PlayError::ConfigError(e.to_string()))?;
        if config.max_passes == Some(0) {
            return Err(PlayError::ConfigError("max-passes must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            max_passes: self.max_passes,
        }
    }
}
