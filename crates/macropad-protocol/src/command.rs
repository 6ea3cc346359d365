//! Outgoing commands

use serde::{Deserialize, Serialize};

use crate::config::DeviceConfig;
use crate::error::{ProtocolError, ProtocolResult};
use crate::header::ProtocolHeader;

/// Command sent to the device, serialized as `{"type": "<Variant>", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Request the full configuration
    GetConfig {
        /// Request header
        header: ProtocolHeader,
    },
    /// Apply a full or partial configuration
    SetConfig {
        /// Request header
        header: ProtocolHeader,
        /// Configuration to merge on the device
        config: DeviceConfig,
    },
    /// Restore factory configuration
    ResetConfig {
        /// Request header
        header: ProtocolHeader,
    },
    /// Restart the device
    Reboot {
        /// Request header
        header: ProtocolHeader,
    },
}

impl Command {
    /// Build a GetConfig command
    pub fn get_config(header: ProtocolHeader) -> Self {
        Command::GetConfig { header }
    }

    /// Build a SetConfig command
    pub fn set_config(header: ProtocolHeader, config: DeviceConfig) -> Self {
        Command::SetConfig { header, config }
    }

    /// Build a ResetConfig command
    pub fn reset_config(header: ProtocolHeader) -> Self {
        Command::ResetConfig { header }
    }

    /// Build a Reboot command
    pub fn reboot(header: ProtocolHeader) -> Self {
        Command::Reboot { header }
    }

    /// Header carried by this command
    pub fn header(&self) -> &ProtocolHeader {
        match self {
            Command::GetConfig { header }
            | Command::SetConfig { header, .. }
            | Command::ResetConfig { header }
            | Command::Reboot { header } => header,
        }
    }

    /// Command discriminant
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::GetConfig { .. } => CommandKind::GetConfig,
            Command::SetConfig { .. } => CommandKind::SetConfig,
            Command::ResetConfig { .. } => CommandKind::ResetConfig,
            Command::Reboot { .. } => CommandKind::Reboot,
        }
    }

    /// Serialize to the JSON payload carried inside a frame
    pub fn to_payload(&self) -> ProtocolResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

/// Command discriminant without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// GetConfig
    GetConfig,
    /// SetConfig
    SetConfig,
    /// ResetConfig
    ResetConfig,
    /// Reboot
    Reboot,
}

impl CommandKind {
    /// Wire tag
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::GetConfig => "GetConfig",
            CommandKind::SetConfig => "SetConfig",
            CommandKind::ResetConfig => "ResetConfig",
            CommandKind::Reboot => "Reboot",
        }
    }

    /// Whether a successful reply is an Ack (as opposed to a Config)
    pub fn expects_ack(self) -> bool {
        !matches!(self, CommandKind::GetConfig)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
