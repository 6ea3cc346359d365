//! Incoming responses

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compat::canonicalize_response;
use crate::config::DeviceConfig;
use crate::error::{ProtocolError, ProtocolResult};
use crate::header::ProtocolHeader;

/// Reply from the device, externally tagged on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// Current configuration
    Config(ConfigResponse),
    /// Command acknowledgement
    Ack(AckResponse),
    /// Device-side failure
    Error(ErrorResponse),
}

/// Body of a Config response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// Response header
    pub header: ProtocolHeader,
    /// Full configuration
    pub config: DeviceConfig,
}

/// Body of an Ack response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Response header
    pub header: ProtocolHeader,
    /// Human-readable status
    #[serde(default)]
    pub message: String,
    /// Whether the command took effect
    pub success: bool,
}

/// Body of an Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Response header
    pub header: ProtocolHeader,
    /// Failure description
    #[serde(default)]
    pub message: String,
    /// Device error code
    #[serde(rename = "errorCode")]
    pub error_code: u32,
}

/// Response discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Config
    Config,
    /// Ack
    Ack,
    /// Error
    Error,
}

impl std::fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseKind::Config => write!(f, "Config"),
            ResponseKind::Ack => write!(f, "Ack"),
            ResponseKind::Error => write!(f, "Error"),
        }
    }
}

impl Response {
    /// Header carried by this response
    pub fn header(&self) -> &ProtocolHeader {
        match self {
            Response::Config(body) => &body.header,
            Response::Ack(body) => &body.header,
            Response::Error(body) => &body.header,
        }
    }

    /// Response discriminant
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Config(_) => ResponseKind::Config,
            Response::Ack(_) => ResponseKind::Ack,
            Response::Error(_) => ResponseKind::Error,
        }
    }

    /// Classify an already parsed JSON value
    pub fn from_value(value: Value) -> ProtocolResult<Self> {
        let canonical = canonicalize_response(value)?;
        serde_json::from_value(canonical).map_err(|e| ProtocolError::InvalidStructure(e.to_string()))
    }
}

/// Parse a complete payload into a [`Response`].
///
/// Bytes that are not JSON give [`ProtocolError::InvalidJson`]; valid JSON
/// that matches no response shape gives [`ProtocolError::InvalidStructure`].
pub fn parse_response(payload: &[u8]) -> ProtocolResult<Response> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;
    Response::from_value(value)
}
