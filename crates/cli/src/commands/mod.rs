//! Command implementations for macropadctl

pub mod config;
pub mod device;
pub mod log;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use macropad_client::{ClientConfig, DeviceSession};

use crate::error::CliError;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Read and show the device configuration
    Get,

    /// Write a configuration file (JSON or YAML, zero-based slots)
    Set {
        /// Configuration file path
        file: PathBuf,
    },

    /// Restore the factory configuration
    Reset,
}

/// Open a session and connect to the device
pub async fn open_session(settings: &ClientConfig) -> Result<DeviceSession> {
    let session = DeviceSession::usb(settings.clone()).map_err(CliError::from)?;
    session.try_connect().await.map_err(CliError::from)?;
    Ok(session)
}

/// Close the session, logging rather than failing on errors
pub async fn close_session(session: &DeviceSession) {
    if let Err(e) = session.try_disconnect().await {
        tracing::warn!("Failed to disconnect: {}", e);
    }
}
