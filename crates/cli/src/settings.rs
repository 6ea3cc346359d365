//! Client settings from file, environment and flags

use std::path::Path;

use macropad_client::ClientConfig;
use macropad_frame::FrameMode;
use tracing::debug;

use crate::error::CliError;

/// Flag overrides applied on top of the settings file
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub timeout_ms: Option<u64>,
    pub raw: bool,
    pub verify_correlation: bool,
}

/// Load settings from an optional YAML file and apply `overrides`
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<ClientConfig, CliError> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading settings");
            let text = std::fs::read_to_string(path)?;
            serde_yaml::from_str::<ClientConfig>(&text)?
        }
        None => ClientConfig::default(),
    };

    if let Some(timeout_ms) = overrides.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    if overrides.raw {
        config.frame_mode = FrameMode::Raw;
    }
    if overrides.verify_correlation {
        config.verify_correlation = true;
    }

    config
        .validate()
        .map_err(|e| CliError::InvalidConfiguration(e.to_string()))?;
    Ok(config)
}
