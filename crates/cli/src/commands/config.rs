//! Configuration read/write commands

use anyhow::{Context, Result};
use std::path::Path;

use macropad_client::ClientConfig;
use macropad_config::DeviceConfig;

use crate::commands::{ConfigCommands, close_session, open_session};
use crate::error::CliError;
use crate::output;

/// Execute config command
pub async fn execute(cmd: &ConfigCommands, settings: &ClientConfig, json: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Get => get(settings, json).await,
        ConfigCommands::Set { file } => set(settings, file, json).await,
        ConfigCommands::Reset => reset(settings, json).await,
    }
}

async fn get(settings: &ClientConfig, json: bool) -> Result<()> {
    let session = open_session(settings).await?;
    let result = session.try_get_config().await;
    close_session(&session).await;

    let config = result.map_err(CliError::from)?;
    output::print_config(&config, json);
    Ok(())
}

async fn set(settings: &ClientConfig, file: &Path, json: bool) -> Result<()> {
    let config = read_config_file(file)
        .with_context(|| format!("Failed to load configuration from {}", file.display()))?;

    let session = open_session(settings).await?;
    // The stored configuration is the baseline for deleting dropped widgets
    let result = match session.try_get_config().await {
        Ok(_) => session.try_set_config(config).await,
        Err(e) => Err(e),
    };
    close_session(&session).await;

    result.map_err(CliError::from)?;
    output::print_success("Configuration written", json);
    Ok(())
}

async fn reset(settings: &ClientConfig, json: bool) -> Result<()> {
    let session = open_session(settings).await?;
    let result = session.try_reset_config().await;
    close_session(&session).await;

    result.map_err(CliError::from)?;
    output::print_success("Configuration reset to defaults", json);
    Ok(())
}

/// Parse a configuration file; `.yaml`/`.yml` as YAML, anything else as JSON
pub fn read_config_file(path: &Path) -> Result<DeviceConfig, CliError> {
    let text = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}
