//! Device identity and lifecycle commands

use anyhow::Result;
use macropad_client::ClientConfig;

use crate::commands::{close_session, open_session};
use crate::error::CliError;
use crate::output;

/// Show the connected device
pub async fn info(settings: &ClientConfig, json: bool) -> Result<()> {
    let session = open_session(settings).await?;
    if let Some(info) = session.connection_info() {
        output::print_connection_info(&info, json);
    }
    close_session(&session).await;
    Ok(())
}

/// Reboot the device; the session ends with it
pub async fn reboot(settings: &ClientConfig, json: bool) -> Result<()> {
    let session = open_session(settings).await?;
    session.try_reboot().await.map_err(CliError::from)?;
    output::print_success("Device is rebooting", json);
    Ok(())
}
