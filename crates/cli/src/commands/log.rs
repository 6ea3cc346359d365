//! Show the raw payload log for a configuration read

use anyhow::Result;
use macropad_client::ClientConfig;

use crate::commands::{close_session, open_session};
use crate::output;

/// Read the configuration and print every exchanged payload
pub async fn execute(settings: &ClientConfig, json: bool) -> Result<()> {
    let session = open_session(settings).await?;
    if let Err(e) = session.try_get_config().await {
        tracing::warn!("Configuration read failed: {}", e);
    }
    close_session(&session).await;

    output::print_debug_log(&session.debug_log().entries(), json);
    Ok(())
}
